//! Withdrawal Gateway
//!
//! Depositor entry points. Each call settles the depositor's pending
//! collateral gain, moves principal, and re-anchors the record at the pool's
//! current accumulators.

use sp_common::{
    errors::{PoolError, PoolResult},
    events::PoolEvent,
    ledger::{Asset, Ledger},
    types::{is_zero_address, short_hex, Address},
    Decimal,
};

use crate::engine;
use crate::registry::DepositSnapshot;
use crate::StabilityPool;

/// Outcome of `provide_to_sp`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositResult {
    /// Debt tokens pulled from the depositor
    pub amount_deposited: Decimal,
    /// Compounded value of the existing deposit before this call
    pub compounded_before: Decimal,
    /// Collateral gain paid out
    pub collateral_gain: Decimal,
    /// Debt absorbed from the old deposit since its last anchor
    pub debt_loss: Decimal,
    /// Principal after re-anchoring
    pub new_deposit: Decimal,
}

/// Outcome of `withdraw_from_sp`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawResult {
    /// Debt tokens returned to the depositor
    pub amount_withdrawn: Decimal,
    pub compounded_before: Decimal,
    pub collateral_gain: Decimal,
    pub debt_loss: Decimal,
    /// Principal left in the pool (zero clears the record)
    pub remaining_deposit: Decimal,
}

/// Outcome of `withdraw_collateral_gain_to_position`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainTransferResult {
    pub position: Address,
    /// Collateral moved to the active pool for `position`
    pub collateral_moved: Decimal,
    /// Principal left in the pool, re-anchored
    pub compounded_deposit: Decimal,
    pub debt_loss: Decimal,
}

/// Compounded value and gain of a record, computed once per call
struct Settlement {
    initial: Decimal,
    compounded: Decimal,
    gain: Decimal,
}

impl Settlement {
    fn debt_loss(&self) -> Decimal {
        self.initial.saturating_sub(self.compounded)
    }
}

impl<L: Ledger> StabilityPool<L> {
    /// Deposit `amount` debt tokens, paying out any pending collateral gain
    pub fn provide_to_sp(&mut self, depositor: Address, amount: Decimal) -> PoolResult<DepositResult> {
        self.atomically("provide_to_sp", |pool| pool.execute_provide(depositor, amount))
    }

    /// Withdraw up to `amount` of the compounded deposit plus the whole gain
    ///
    /// A zero `amount` only claims the collateral gain.
    pub fn withdraw_from_sp(&mut self, depositor: Address, amount: Decimal) -> PoolResult<WithdrawResult> {
        self.atomically("withdraw_from_sp", |pool| pool.execute_withdraw(depositor, amount))
    }

    /// Send the whole collateral gain to the active pool on behalf of
    /// `position`, leaving the deposit in the pool
    pub fn withdraw_collateral_gain_to_position(
        &mut self,
        depositor: Address,
        position: Address,
    ) -> PoolResult<GainTransferResult> {
        self.atomically("withdraw_collateral_gain_to_position", |pool| {
            pool.execute_gain_to_position(depositor, position)
        })
    }

    // ============ Execution ============

    fn execute_provide(&mut self, depositor: Address, amount: Decimal) -> PoolResult<DepositResult> {
        // 1. Amount must be positive
        if amount.is_zero() {
            return Err(PoolError::ZeroAmount);
        }

        // 2. Settle the existing deposit, if any
        let settlement = self.settle(&depositor)?;

        // 3. Pull debt tokens from the depositor
        let sp = self.config.stability_pool;
        self.ledger.transfer(Asset::DebtToken, &depositor, &sp, amount)?;

        // 4. Pay out pending collateral
        self.pay_collateral_gain(&depositor, &settlement)?;

        // 5. Re-anchor at compounded + amount
        let new_deposit = settlement.compounded.checked_add(amount)?;
        self.anchor_deposit(depositor, new_deposit);

        // 6. Grow the pool
        self.state.total_deposits = self.state.total_deposits.checked_add(amount)?;
        self.emit(PoolEvent::TotalDepositsUpdated {
            total: self.state.total_deposits,
        });

        log::debug!(
            "deposit {} by {}, principal now {}",
            amount,
            short_hex(&depositor),
            new_deposit
        );

        Ok(DepositResult {
            amount_deposited: amount,
            compounded_before: settlement.compounded,
            collateral_gain: settlement.gain,
            debt_loss: settlement.debt_loss(),
            new_deposit,
        })
    }

    fn execute_withdraw(&mut self, depositor: Address, amount: Decimal) -> PoolResult<WithdrawResult> {
        // 1. Depositor must have a record
        if !self.deposits.contains(&depositor) {
            return Err(PoolError::DepositNotFound { depositor });
        }

        // 2. Settle and clamp to the compounded value
        let settlement = self.settle(&depositor)?;
        let withdrawn = amount.min(settlement.compounded);

        // 3. Pay out collateral, then principal
        self.pay_collateral_gain(&depositor, &settlement)?;
        let sp = self.config.stability_pool;
        self.ledger.transfer(Asset::DebtToken, &sp, &depositor, withdrawn)?;

        // 4. Re-anchor the remainder (clears the record at zero)
        let remaining = settlement.compounded.checked_sub(withdrawn)?;
        self.anchor_deposit(depositor, remaining);

        // 5. Shrink the pool
        if !withdrawn.is_zero() {
            self.state.total_deposits = self.state.total_deposits.checked_sub(withdrawn)?;
            self.emit(PoolEvent::TotalDepositsUpdated {
                total: self.state.total_deposits,
            });
        }

        log::debug!(
            "withdrawal {} by {}, principal now {}",
            withdrawn,
            short_hex(&depositor),
            remaining
        );

        Ok(WithdrawResult {
            amount_withdrawn: withdrawn,
            compounded_before: settlement.compounded,
            collateral_gain: settlement.gain,
            debt_loss: settlement.debt_loss(),
            remaining_deposit: remaining,
        })
    }

    fn execute_gain_to_position(
        &mut self,
        depositor: Address,
        position: Address,
    ) -> PoolResult<GainTransferResult> {
        // 1. Validate inputs
        if is_zero_address(&position) {
            return Err(PoolError::InvalidAddress {
                reason: "position is the zero address",
            });
        }
        if !self.deposits.contains(&depositor) {
            return Err(PoolError::DepositNotFound { depositor });
        }

        // 2. Must have a gain to move
        let settlement = self.settle(&depositor)?;
        if settlement.gain.is_zero() {
            return Err(PoolError::NoRewardsToClaim);
        }

        // 3. Re-anchor at the compounded value; principal stays in the pool
        self.anchor_deposit(depositor, settlement.compounded);

        // 4. Collateral leaves the pool for the position's active balance
        let config = self.config;
        self.state.total_collateral = self.state.total_collateral.checked_sub(settlement.gain)?;
        self.ledger.transfer(
            Asset::Collateral,
            &config.stability_pool,
            &config.active_pool,
            settlement.gain,
        )?;

        self.emit(PoolEvent::CollateralGainMovedToPosition {
            depositor,
            position,
            collateral: settlement.gain,
        });
        self.emit(PoolEvent::CollateralBalanceUpdated {
            total: self.state.total_collateral,
        });

        Ok(GainTransferResult {
            position,
            collateral_moved: settlement.gain,
            compounded_deposit: settlement.compounded,
            debt_loss: settlement.debt_loss(),
        })
    }

    // ============ Helpers ============

    fn settle(&self, depositor: &Address) -> PoolResult<Settlement> {
        match self.deposits.get(depositor) {
            Some(record) => Ok(Settlement {
                initial: record.initial_deposit,
                compounded: engine::compounded_deposit(&self.state, record)?,
                gain: engine::collateral_gain(&self.state, record)?,
            }),
            None => Ok(Settlement {
                initial: Decimal::ZERO,
                compounded: Decimal::ZERO,
                gain: Decimal::ZERO,
            }),
        }
    }

    fn pay_collateral_gain(&mut self, depositor: &Address, settlement: &Settlement) -> PoolResult<()> {
        if settlement.gain.is_zero() {
            return Ok(());
        }

        self.state.total_collateral = self.state.total_collateral.checked_sub(settlement.gain)?;
        let sp = self.config.stability_pool;
        self.ledger
            .transfer(Asset::Collateral, &sp, depositor, settlement.gain)?;

        self.emit(PoolEvent::CollateralGainWithdrawn {
            depositor: *depositor,
            collateral: settlement.gain,
            debt_loss: settlement.debt_loss(),
        });
        self.emit(PoolEvent::CollateralBalanceUpdated {
            total: self.state.total_collateral,
        });
        Ok(())
    }

    fn anchor_deposit(&mut self, depositor: Address, amount: Decimal) {
        let snapshot = self.state.snapshot();
        let stored = self.deposits.anchor(depositor, amount, snapshot);
        let snapshot = match stored {
            Some(record) => record.snapshot,
            None => DepositSnapshot::default(),
        };

        self.emit(PoolEvent::DepositUpdated { depositor, amount });
        self.emit(PoolEvent::DepositSnapshotUpdated {
            depositor,
            p: snapshot.p,
            s: snapshot.s,
            epoch: snapshot.epoch,
            scale: snapshot.scale,
        });
    }
}
