//! Deposit Registry
//!
//! Principal plus accumulator snapshot for each depositor. Records are only
//! touched when their owner interacts with the pool; offsets never iterate
//! the registry.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use sp_common::{Address, Decimal};

/// Pool accumulators captured when a record was last anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DepositSnapshot {
    /// `P` at anchor time
    pub p: Decimal,
    /// `S[epoch][scale]` at anchor time
    pub s: Decimal,
    pub epoch: u64,
    pub scale: u64,
}

/// A depositor's stake in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DepositRecord {
    /// Principal as of the last deposit, withdrawal or re-anchor
    pub initial_deposit: Decimal,
    pub snapshot: DepositSnapshot,
}

/// All live deposit records, keyed by depositor
#[derive(Debug, Clone, Default)]
pub struct DepositRegistry {
    deposits: BTreeMap<Address, DepositRecord>,
    /// Previous values of records touched since `begin_journal`
    journal: Option<Vec<(Address, Option<DepositRecord>)>>,
}

impl DepositRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted records, skipping empty ones
    pub fn from_records(records: impl IntoIterator<Item = (Address, DepositRecord)>) -> Self {
        Self {
            deposits: records
                .into_iter()
                .filter(|(_, record)| !record.initial_deposit.is_zero())
                .collect(),
            journal: None,
        }
    }

    pub fn get(&self, depositor: &Address) -> Option<&DepositRecord> {
        self.deposits.get(depositor)
    }

    pub fn contains(&self, depositor: &Address) -> bool {
        self.deposits.contains_key(depositor)
    }

    /// Create or replace a record; a zero amount clears it instead
    ///
    /// Returns the stored record, or `None` when the record was cleared.
    pub fn anchor(
        &mut self,
        depositor: Address,
        amount: Decimal,
        snapshot: DepositSnapshot,
    ) -> Option<DepositRecord> {
        if amount.is_zero() {
            self.clear(&depositor);
            return None;
        }

        let record = DepositRecord {
            initial_deposit: amount,
            snapshot,
        };
        let previous = self.deposits.insert(depositor, record);
        self.record_undo(depositor, previous);
        Some(record)
    }

    /// Remove a record, returning it if one existed
    pub fn clear(&mut self, depositor: &Address) -> Option<DepositRecord> {
        let previous = self.deposits.remove(depositor);
        if previous.is_some() {
            self.record_undo(*depositor, previous);
        }
        previous
    }

    pub fn len(&self) -> usize {
        self.deposits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deposits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &DepositRecord)> {
        self.deposits.iter()
    }

    // ============ Journal ============

    /// Start remembering overwritten records so they can be restored
    pub(crate) fn begin_journal(&mut self) {
        self.journal = Some(Vec::new());
    }

    /// Keep every change made since `begin_journal`
    pub(crate) fn commit_journal(&mut self) {
        self.journal = None;
    }

    /// Undo every change made since `begin_journal`
    pub(crate) fn rollback_journal(&mut self) {
        let Some(entries) = self.journal.take() else {
            return;
        };
        for (depositor, previous) in entries.into_iter().rev() {
            match previous {
                Some(record) => {
                    self.deposits.insert(depositor, record);
                }
                None => {
                    self.deposits.remove(&depositor);
                }
            }
        }
    }

    fn record_undo(&mut self, depositor: Address, previous: Option<DepositRecord>) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push((depositor, previous));
        }
    }
}
