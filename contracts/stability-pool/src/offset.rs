//! Offset Coordinator
//!
//! Entry point for the liquidation subsystem. Absorbs as much of a
//! liquidated position's debt as the pool can cover, credits the matching
//! share of collateral to depositors and routes the rest to the default pool.

use sp_common::{
    errors::PoolResult,
    events::PoolEvent,
    ledger::{Asset, Ledger},
    Decimal,
};

use crate::engine;
use crate::StabilityPool;

/// How a liquidation was split between the pool and redistribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OffsetResult {
    /// Debt burned from pool deposits
    pub debt_offset: Decimal,
    /// Collateral credited to depositors
    pub collateral_to_pool: Decimal,
    /// Debt left for redistribution to open positions
    pub debt_to_redistribute: Decimal,
    /// Collateral sent to the default pool
    pub collateral_to_redistribute: Decimal,
}

/// Split a liquidation between the pool and redistribution
///
/// Debt is clamped to the pool's deposits and collateral follows the debt
/// proportionally. An empty pool or a debt-free liquidation offsets nothing.
pub fn split_offset(
    total_deposits: Decimal,
    debt: Decimal,
    collateral: Decimal,
) -> PoolResult<OffsetResult> {
    if total_deposits.is_zero() || debt.is_zero() {
        return Ok(OffsetResult {
            debt_offset: Decimal::ZERO,
            collateral_to_pool: Decimal::ZERO,
            debt_to_redistribute: debt,
            collateral_to_redistribute: collateral,
        });
    }

    let debt_offset = debt.min(total_deposits);
    let collateral_to_pool = if debt_offset == debt {
        collateral
    } else {
        collateral.mul_div(debt_offset, debt)?
    };

    Ok(OffsetResult {
        debt_offset,
        collateral_to_pool,
        debt_to_redistribute: debt.checked_sub(debt_offset)?,
        collateral_to_redistribute: collateral.checked_sub(collateral_to_pool)?,
    })
}

impl<L: Ledger> StabilityPool<L> {
    /// Offset a liquidation of `debt` backed by `collateral` against the pool
    ///
    /// Burns the absorbed debt from the pool's deposits, moves the pool's
    /// collateral share from the active pool to the stability pool, and the
    /// remainder from the active pool to the default pool.
    pub fn offset(&mut self, debt: Decimal, collateral: Decimal) -> PoolResult<OffsetResult> {
        self.atomically("offset", |pool| pool.execute_offset(debt, collateral))
    }

    fn execute_offset(&mut self, debt: Decimal, collateral: Decimal) -> PoolResult<OffsetResult> {
        let config = self.config;

        // 1. Clamp to what the pool can absorb
        let split = split_offset(self.state.total_deposits, debt, collateral)?;

        // 2. Update accumulators and move the absorbed value
        if !split.debt_offset.is_zero() {
            let outcome = engine::apply_offset(
                &mut self.state,
                split.debt_offset,
                split.collateral_to_pool,
            )?;
            self.state.total_collateral = self
                .state
                .total_collateral
                .checked_add(split.collateral_to_pool)?;
            self.state.offset_count += 1;

            self.ledger
                .burn(Asset::DebtToken, &config.stability_pool, split.debt_offset)?;
            self.ledger.transfer(
                Asset::Collateral,
                &config.active_pool,
                &config.stability_pool,
                split.collateral_to_pool,
            )?;

            self.emit(PoolEvent::SumUpdated {
                epoch: outcome.sum_epoch,
                scale: outcome.sum_scale,
                sum: outcome.new_sum,
            });
            if outcome.epoch_changed {
                log::info!("pool emptied, epoch now {}", self.state.current_epoch);
                self.emit(PoolEvent::EpochUpdated {
                    epoch: self.state.current_epoch,
                });
                self.emit(PoolEvent::ScaleUpdated { scale: 0 });
            } else if outcome.scale_changed {
                log::info!("P rescaled, scale now {}", self.state.current_scale);
                self.emit(PoolEvent::ScaleUpdated {
                    scale: self.state.current_scale,
                });
            }
            self.emit(PoolEvent::ProductUpdated { p: outcome.new_p });
            self.emit(PoolEvent::TotalDepositsUpdated {
                total: self.state.total_deposits,
            });
            self.emit(PoolEvent::CollateralBalanceUpdated {
                total: self.state.total_collateral,
            });
        }

        // 3. Whatever the pool could not cover goes to the default pool
        self.ledger.transfer(
            Asset::Collateral,
            &config.active_pool,
            &config.default_pool,
            split.collateral_to_redistribute,
        )?;

        self.emit(PoolEvent::Offset {
            debt_offset: split.debt_offset,
            collateral_to_pool: split.collateral_to_pool,
            debt_to_redistribute: split.debt_to_redistribute,
            collateral_to_redistribute: split.collateral_to_redistribute,
        });
        log::info!(
            "offset: absorbed {} debt for {} collateral, redistributing {} debt / {} collateral",
            split.debt_offset,
            split.collateral_to_pool,
            split.debt_to_redistribute,
            split.collateral_to_redistribute
        );

        Ok(split)
    }
}
