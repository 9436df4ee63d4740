//! Ledger Collaborator
//!
//! The pool never holds token balances itself; it instructs a ledger to move
//! the debt token and the collateral asset between accounts. A ledger must be
//! able to checkpoint and roll back so a failed pool operation leaves no
//! partial transfers behind.

use std::collections::{BTreeMap, BTreeSet};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::errors::{PoolError, PoolResult};
use crate::types::{short_hex, Address};

/// Assets the pool moves
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub enum Asset {
    /// The stablecoin deposited into the pool and burned on offset
    DebtToken,
    /// The collateral seized from liquidated positions
    Collateral,
}

/// Value-transfer primitives the pool depends on
pub trait Ledger {
    /// Opaque restore point
    type Checkpoint;

    fn balance_of(&self, asset: Asset, account: &Address) -> Decimal;

    /// Move `amount` of `asset`; fails without side effects if `from` lacks funds
    fn transfer(
        &mut self,
        asset: Asset,
        from: &Address,
        to: &Address,
        amount: Decimal,
    ) -> PoolResult<()>;

    /// Destroy `amount` of `asset` held by `from`
    fn burn(&mut self, asset: Asset, from: &Address, amount: Decimal) -> PoolResult<()>;

    fn checkpoint(&self) -> Self::Checkpoint;

    /// Undo everything since `checkpoint` was taken
    fn rollback(&mut self, checkpoint: Self::Checkpoint);
}

/// In-memory ledger for tests and single-process hosts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLedger {
    balances: BTreeMap<(Asset, Address), Decimal>,
    supply: BTreeMap<Asset, Decimal>,
    frozen: BTreeSet<Address>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new units of `asset` for `to`
    pub fn mint(&mut self, asset: Asset, to: &Address, amount: Decimal) -> PoolResult<()> {
        let supply = self.total_supply(asset).checked_add(amount)?;
        let balance = self.balance_of(asset, to).checked_add(amount)?;
        self.supply.insert(asset, supply);
        self.balances.insert((asset, *to), balance);
        Ok(())
    }

    pub fn total_supply(&self, asset: Asset) -> Decimal {
        self.supply.get(&asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Reject every transfer or burn touching `account`
    pub fn freeze(&mut self, account: &Address) {
        self.frozen.insert(*account);
    }

    pub fn unfreeze(&mut self, account: &Address) {
        self.frozen.remove(account);
    }

    fn debit(&mut self, asset: Asset, from: &Address, amount: Decimal) -> PoolResult<()> {
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(PoolError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
        let remaining = available.checked_sub(amount)?;
        if remaining.is_zero() {
            self.balances.remove(&(asset, *from));
        } else {
            self.balances.insert((asset, *from), remaining);
        }
        Ok(())
    }
}

impl Ledger for MemoryLedger {
    type Checkpoint = MemoryLedger;

    fn balance_of(&self, asset: Asset, account: &Address) -> Decimal {
        self.balances
            .get(&(asset, *account))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn transfer(
        &mut self,
        asset: Asset,
        from: &Address,
        to: &Address,
        amount: Decimal,
    ) -> PoolResult<()> {
        if self.frozen.contains(from) || self.frozen.contains(to) {
            return Err(PoolError::TransferFailed {
                from: *from,
                to: *to,
                amount,
            });
        }
        if amount.is_zero() || from == to {
            return Ok(());
        }

        let credited = self.balance_of(asset, to).checked_add(amount)?;
        self.debit(asset, from, amount)?;
        self.balances.insert((asset, *to), credited);

        log::trace!(
            "{:?} transfer {} from {} to {}",
            asset,
            amount,
            short_hex(from),
            short_hex(to)
        );
        Ok(())
    }

    fn burn(&mut self, asset: Asset, from: &Address, amount: Decimal) -> PoolResult<()> {
        if self.frozen.contains(from) {
            return Err(PoolError::TransferFailed {
                from: *from,
                to: [0u8; 32],
                amount,
            });
        }
        if amount.is_zero() {
            return Ok(());
        }

        self.debit(asset, from, amount)?;
        let supply = self.total_supply(asset).checked_sub(amount)?;
        self.supply.insert(asset, supply);
        Ok(())
    }

    fn checkpoint(&self) -> Self::Checkpoint {
        self.clone()
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        *self = checkpoint;
    }
}
