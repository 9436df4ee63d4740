//! Stability Pool
//!
//! First line of defense of a CDP system. Depositors provide debt tokens;
//! liquidations burn those deposits and hand the seized collateral to the
//! depositors pro rata.
//!
//! ## Product-Sum Accounting
//!
//! Offsets never iterate depositors:
//! - `P` tracks the multiplicative shrinkage of every deposit
//! - `S[epoch][scale]` tracks collateral gained per unit deposited
//! - each record stores the `(P, S, epoch, scale)` it was anchored at
//! - balances are recomputed from the snapshot when the depositor returns
//!
//! Every state-changing call is atomic: if the ledger rejects a transfer,
//! the pool state, the registry, the event log and the ledger are restored.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use sp_common::{
    constants::domains,
    errors::{PoolError, PoolResult},
    events::{EventLog, PoolEvent},
    ledger::Ledger,
    types::{derive_address, is_zero_address, Address},
    Decimal,
};

pub mod engine;
pub mod gateway;
pub mod offset;
pub mod persistence;
pub mod registry;
pub mod shared;
pub mod state;

#[cfg(test)]
mod proptest_properties;

pub use engine::{OffsetOutcome, RewardsPerUnit};
pub use gateway::{DepositResult, GainTransferResult, WithdrawResult};
pub use offset::OffsetResult;
pub use persistence::PoolSnapshot;
pub use registry::{DepositRecord, DepositRegistry, DepositSnapshot};
pub use shared::SharedStabilityPool;
pub use state::{PoolState, PoolStats};

// ============ Stability Pool Config ============

/// Ledger accounts the pool moves value between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolConfig {
    /// Holds deposited debt tokens and collateral owed to depositors
    pub stability_pool: Address,
    /// Holds collateral of open positions
    pub active_pool: Address,
    /// Receives collateral of liquidations the pool could not absorb
    pub default_pool: Address,
}

impl PoolConfig {
    /// Deterministic account ids for the pool of one collateral type
    pub fn derive(label: &str) -> Self {
        Self {
            stability_pool: derive_address(domains::STABILITY_POOL, label),
            active_pool: derive_address(domains::ACTIVE_POOL, label),
            default_pool: derive_address(domains::DEFAULT_POOL, label),
        }
    }

    /// Reject zero or duplicate accounts
    pub fn validate(&self) -> PoolResult<()> {
        for account in [&self.stability_pool, &self.active_pool, &self.default_pool] {
            if is_zero_address(account) {
                return Err(PoolError::InvalidAddress {
                    reason: "pool account is the zero address",
                });
            }
        }

        if self.stability_pool == self.active_pool
            || self.stability_pool == self.default_pool
            || self.active_pool == self.default_pool
        {
            return Err(PoolError::InvalidInput {
                param: "config",
                reason: "pool accounts must be distinct",
            });
        }

        Ok(())
    }
}

// ============ Stability Pool ============

/// A stability pool bound to a ledger
#[derive(Debug)]
pub struct StabilityPool<L: Ledger> {
    pub(crate) config: PoolConfig,
    pub(crate) state: PoolState,
    pub(crate) deposits: DepositRegistry,
    pub(crate) ledger: L,
    pub(crate) events: EventLog,
}

impl<L: Ledger> StabilityPool<L> {
    /// Create an empty pool
    pub fn new(config: PoolConfig, ledger: L) -> PoolResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: PoolState::new(),
            deposits: DepositRegistry::new(),
            ledger,
            events: EventLog::new(),
        })
    }

    /// Run `op`, undoing every effect if it fails
    pub(crate) fn atomically<T>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&mut Self) -> PoolResult<T>,
    ) -> PoolResult<T> {
        let state = self.state.checkpoint();
        let event_count = self.events.len();
        let checkpoint = self.ledger.checkpoint();
        self.deposits.begin_journal();

        match op(self) {
            Ok(value) => {
                self.deposits.commit_journal();
                Ok(value)
            }
            Err(err) => {
                log::warn!("{operation} rolled back: {err}");
                self.state.restore(state);
                self.events.truncate(event_count);
                self.ledger.rollback(checkpoint);
                self.deposits.rollback_journal();
                Err(err)
            }
        }
    }

    pub(crate) fn emit(&mut self, event: PoolEvent) {
        self.events.emit(event);
    }

    // ============ Queries ============

    /// Current compounded value of `depositor`'s deposit (zero if none)
    pub fn compounded_deposit(&self, depositor: &Address) -> PoolResult<Decimal> {
        match self.deposits.get(depositor) {
            Some(record) => engine::compounded_deposit(&self.state, record),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Collateral `depositor` could claim right now (zero if none)
    pub fn collateral_gain(&self, depositor: &Address) -> PoolResult<Decimal> {
        match self.deposits.get(depositor) {
            Some(record) => engine::collateral_gain(&self.state, record),
            None => Ok(Decimal::ZERO),
        }
    }

    pub fn current_epoch(&self) -> u64 {
        self.state.current_epoch
    }

    pub fn current_scale(&self) -> u64 {
        self.state.current_scale
    }

    /// Running product factor `P`
    pub fn p(&self) -> Decimal {
        self.state.product_p
    }

    pub fn total_deposits(&self) -> Decimal {
        self.state.total_deposits
    }

    pub fn total_collateral(&self) -> Decimal {
        self.state.total_collateral
    }

    /// `S[epoch][scale]`
    pub fn sum_at(&self, epoch: u64, scale: u64) -> Decimal {
        self.state.sum_at(epoch, scale)
    }

    pub fn deposit(&self, depositor: &Address) -> Option<&DepositRecord> {
        self.deposits.get(depositor)
    }

    pub fn depositor_count(&self) -> usize {
        self.deposits.len()
    }

    /// Aggregate statistics, with coverage measured against `system_debt`
    pub fn stats(&self, system_debt: Decimal) -> PoolStats {
        self.state.stats(self.deposits.len() as u64, system_debt)
    }

    pub fn state(&self) -> &PoolState {
        &self.state
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct ledger access for hosts funding accounts outside the pool
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Hand collected events to the caller
    pub fn take_events(&mut self) -> Vec<PoolEvent> {
        self.events.drain()
    }
}

// ============ Tests ============
