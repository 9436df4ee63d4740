//! Persistence
//!
//! A pool is stored as one pool record plus one record per depositor,
//! borsh-encoded. The SHA-256 of the encoding serves as a state root.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use sp_common::{
    errors::{PoolError, PoolResult},
    events::EventLog,
    ledger::Ledger,
    types::Address,
};

use crate::registry::{DepositRecord, DepositRegistry};
use crate::state::PoolState;
use crate::{PoolConfig, StabilityPool};

/// Everything needed to rebuild a pool, minus the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolSnapshot {
    pub config: PoolConfig,
    pub state: PoolState,
    /// Live records, ordered by depositor
    pub deposits: Vec<(Address, DepositRecord)>,
}

impl PoolSnapshot {
    /// Serialize for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    pub fn from_bytes(bytes: &[u8]) -> PoolResult<Self> {
        borsh::from_slice(bytes).map_err(|err| {
            log::warn!("pool snapshot decode failed: {err}");
            PoolError::DecodeFailed
        })
    }

    /// SHA-256 of the borsh encoding
    pub fn state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.to_bytes());
        let result = hasher.finalize();
        let mut root = [0u8; 32];
        root.copy_from_slice(&result);
        root
    }

    /// Reject snapshots no live pool could have produced
    pub fn validate(&self) -> PoolResult<()> {
        self.config.validate()?;

        if self.state.product_p.is_zero() {
            return Err(PoolError::InvalidStateTransition);
        }

        let mut previous: Option<&Address> = None;
        for (depositor, record) in &self.deposits {
            if previous.is_some_and(|prev| prev >= depositor) {
                return Err(PoolError::InvalidInput {
                    param: "deposits",
                    reason: "depositors must be unique and sorted",
                });
            }
            if record.snapshot.p.is_zero() || record.snapshot.epoch > self.state.current_epoch {
                return Err(PoolError::InvalidStateTransition);
            }
            previous = Some(depositor);
        }

        Ok(())
    }
}

impl<L: Ledger> StabilityPool<L> {
    /// Capture the pool for storage
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            config: self.config,
            state: self.state.clone(),
            deposits: self
                .deposits
                .iter()
                .map(|(depositor, record)| (*depositor, *record))
                .collect(),
        }
    }

    /// Rebuild a pool from a stored snapshot
    pub fn restore(snapshot: PoolSnapshot, ledger: L) -> PoolResult<Self> {
        snapshot.validate()?;
        log::info!(
            "restoring pool: {} depositors, epoch {}, scale {}",
            snapshot.deposits.len(),
            snapshot.state.current_epoch,
            snapshot.state.current_scale
        );

        Ok(Self {
            config: snapshot.config,
            state: snapshot.state,
            deposits: DepositRegistry::from_records(snapshot.deposits),
            ledger,
            events: EventLog::new(),
        })
    }
}
