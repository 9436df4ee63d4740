//! Pool-global accumulator state
//!
//! One `PoolState` exists per collateral type. It holds the running product
//! `P`, the epoch and scale counters, and the `S[epoch][scale]` sums that
//! together let every depositor's balance be recomputed from a snapshot.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use sp_common::{
    constants::pool::{INITIAL_EPOCH, INITIAL_SCALE},
    math::ratio_bps,
    Decimal, U256,
};

use crate::registry::DepositSnapshot;

/// Accumulators of a single stability pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolState {
    /// Sum of all compounded deposits
    pub total_deposits: Decimal,
    /// Collateral held on behalf of depositors, not yet paid out
    pub total_collateral: Decimal,
    /// Running product factor, starts at 1.0
    pub product_p: Decimal,
    pub current_epoch: u64,
    pub current_scale: u64,
    /// Collateral gain per unit staked, weighted by `P`, keyed by `(epoch, scale)`
    #[serde(with = "sum_buckets")]
    pub epoch_to_scale_to_sum: BTreeMap<(u64, u64), Decimal>,
    /// Truncation remainder of the last collateral-per-unit division
    pub last_collateral_error: Decimal,
    /// Number of offsets that consumed deposits
    pub offset_count: u64,
}

impl Default for PoolState {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolState {
    /// Fresh pool: no deposits, `P = 1.0`, epoch 0, scale 0
    pub fn new() -> Self {
        Self {
            total_deposits: Decimal::ZERO,
            total_collateral: Decimal::ZERO,
            product_p: Decimal::ONE,
            current_epoch: INITIAL_EPOCH,
            current_scale: INITIAL_SCALE,
            epoch_to_scale_to_sum: BTreeMap::new(),
            last_collateral_error: Decimal::ZERO,
            offset_count: 0,
        }
    }

    /// `S[epoch][scale]`, zero for buckets never written
    pub fn sum_at(&self, epoch: u64, scale: u64) -> Decimal {
        self.epoch_to_scale_to_sum
            .get(&(epoch, scale))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// `S` of the current epoch and scale
    pub fn current_sum(&self) -> Decimal {
        self.sum_at(self.current_epoch, self.current_scale)
    }

    pub(crate) fn set_sum(&mut self, epoch: u64, scale: u64, sum: Decimal) {
        self.epoch_to_scale_to_sum.insert((epoch, scale), sum);
    }

    /// Undo point for one operation
    ///
    /// Offsets only ever write the bucket of the current epoch and scale,
    /// so that bucket is the only part of the map that needs saving.
    pub(crate) fn checkpoint(&self) -> StateCheckpoint {
        let bucket = (self.current_epoch, self.current_scale);
        StateCheckpoint {
            total_deposits: self.total_deposits,
            total_collateral: self.total_collateral,
            product_p: self.product_p,
            current_epoch: self.current_epoch,
            current_scale: self.current_scale,
            last_collateral_error: self.last_collateral_error,
            offset_count: self.offset_count,
            bucket,
            bucket_sum: self.epoch_to_scale_to_sum.get(&bucket).copied(),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: StateCheckpoint) {
        self.total_deposits = checkpoint.total_deposits;
        self.total_collateral = checkpoint.total_collateral;
        self.product_p = checkpoint.product_p;
        self.current_epoch = checkpoint.current_epoch;
        self.current_scale = checkpoint.current_scale;
        self.last_collateral_error = checkpoint.last_collateral_error;
        self.offset_count = checkpoint.offset_count;
        match checkpoint.bucket_sum {
            Some(sum) => {
                self.epoch_to_scale_to_sum.insert(checkpoint.bucket, sum);
            }
            None => {
                self.epoch_to_scale_to_sum.remove(&checkpoint.bucket);
            }
        }
    }

    /// Anchor for a record created or updated right now
    pub fn snapshot(&self) -> DepositSnapshot {
        DepositSnapshot {
            p: self.product_p,
            s: self.current_sum(),
            epoch: self.current_epoch,
            scale: self.current_scale,
        }
    }

    /// Coverage ratio against the system's total debt, in basis points
    pub fn coverage_ratio(&self, system_debt: Decimal) -> u64 {
        ratio_bps(self.total_deposits.raw(), system_debt.raw())
    }

    /// Aggregate statistics
    pub fn stats(&self, depositor_count: u64, system_debt: Decimal) -> PoolStats {
        let avg_deposit = if depositor_count > 0 {
            Decimal::from_raw(self.total_deposits.raw() / U256::from(depositor_count))
        } else {
            Decimal::ZERO
        };

        PoolStats {
            total_deposits: self.total_deposits,
            total_collateral: self.total_collateral,
            depositor_count,
            epoch: self.current_epoch,
            scale: self.current_scale,
            product_p: self.product_p,
            offset_count: self.offset_count,
            avg_deposit,
            coverage_ratio_bps: self.coverage_ratio(system_debt),
        }
    }
}

/// Saved scalars and current `S` bucket of a [`PoolState`]
#[derive(Debug, Clone, Copy)]
pub(crate) struct StateCheckpoint {
    total_deposits: Decimal,
    total_collateral: Decimal,
    product_p: Decimal,
    current_epoch: u64,
    current_scale: u64,
    last_collateral_error: Decimal,
    offset_count: u64,
    bucket: (u64, u64),
    bucket_sum: Option<Decimal>,
}

// Tuple keys are not valid map keys in text formats, so the sums travel as a
// list of `((epoch, scale), sum)` entries
mod sum_buckets {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};
    use sp_common::Decimal;

    pub fn serialize<S: Serializer>(
        sums: &BTreeMap<(u64, u64), Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(sums.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(u64, u64), Decimal>, D::Error> {
        let entries = <Vec<((u64, u64), Decimal)> as Deserialize>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

/// Pool statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub total_deposits: Decimal,
    pub total_collateral: Decimal,
    pub depositor_count: u64,
    pub epoch: u64,
    pub scale: u64,
    pub product_p: Decimal,
    pub offset_count: u64,
    /// Average deposit size
    pub avg_deposit: Decimal,
    /// Coverage ratio (bps)
    pub coverage_ratio_bps: u64,
}
