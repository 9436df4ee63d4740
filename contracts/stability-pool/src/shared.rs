//! Shared pool handle
//!
//! A cloneable handle serializing every call through one lock, so offsets
//! and depositor operations from different threads never interleave.

use std::sync::{Arc, Mutex, MutexGuard};

use sp_common::{
    errors::{PoolError, PoolResult},
    events::PoolEvent,
    ledger::Ledger,
    types::Address,
    Decimal,
};

use crate::{
    DepositResult, GainTransferResult, OffsetResult, PoolSnapshot, PoolStats, StabilityPool,
    WithdrawResult,
};

/// Thread-safe stability pool
pub struct SharedStabilityPool<L: Ledger> {
    inner: Arc<Mutex<StabilityPool<L>>>,
}

impl<L: Ledger> Clone for SharedStabilityPool<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: Ledger> SharedStabilityPool<L> {
    pub fn new(pool: StabilityPool<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    fn lock(&self) -> PoolResult<MutexGuard<'_, StabilityPool<L>>> {
        self.inner.lock().map_err(|_| {
            log::warn!("stability pool lock poisoned");
            PoolError::LockPoisoned
        })
    }

    /// Run `f` with exclusive access to the pool
    pub fn with<T>(&self, f: impl FnOnce(&mut StabilityPool<L>) -> T) -> PoolResult<T> {
        let mut pool = self.lock()?;
        Ok(f(&mut pool))
    }

    // ============ Operations ============

    pub fn provide_to_sp(&self, depositor: Address, amount: Decimal) -> PoolResult<DepositResult> {
        self.lock()?.provide_to_sp(depositor, amount)
    }

    pub fn withdraw_from_sp(&self, depositor: Address, amount: Decimal) -> PoolResult<WithdrawResult> {
        self.lock()?.withdraw_from_sp(depositor, amount)
    }

    pub fn withdraw_collateral_gain_to_position(
        &self,
        depositor: Address,
        position: Address,
    ) -> PoolResult<GainTransferResult> {
        self.lock()?
            .withdraw_collateral_gain_to_position(depositor, position)
    }

    pub fn offset(&self, debt: Decimal, collateral: Decimal) -> PoolResult<OffsetResult> {
        self.lock()?.offset(debt, collateral)
    }

    // ============ Queries ============

    pub fn compounded_deposit(&self, depositor: &Address) -> PoolResult<Decimal> {
        self.lock()?.compounded_deposit(depositor)
    }

    pub fn collateral_gain(&self, depositor: &Address) -> PoolResult<Decimal> {
        self.lock()?.collateral_gain(depositor)
    }

    pub fn current_epoch(&self) -> PoolResult<u64> {
        Ok(self.lock()?.current_epoch())
    }

    pub fn current_scale(&self) -> PoolResult<u64> {
        Ok(self.lock()?.current_scale())
    }

    pub fn p(&self) -> PoolResult<Decimal> {
        Ok(self.lock()?.p())
    }

    pub fn total_deposits(&self) -> PoolResult<Decimal> {
        Ok(self.lock()?.total_deposits())
    }

    pub fn stats(&self, system_debt: Decimal) -> PoolResult<PoolStats> {
        Ok(self.lock()?.stats(system_debt))
    }

    pub fn snapshot(&self) -> PoolResult<PoolSnapshot> {
        Ok(self.lock()?.snapshot())
    }

    pub fn take_events(&self) -> PoolResult<Vec<PoolEvent>> {
        Ok(self.lock()?.take_events())
    }
}
