//! Stability Pool Events
//!
//! Events are emitted during pool operations and can be indexed off-chain
//! for building UIs, analytics and reconciliation against the ledger.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::types::Address;

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Depositor Events (0x20 - 0x2F)
    DepositUpdated = 0x20,
    DepositSnapshotUpdated = 0x21,
    CollateralGainWithdrawn = 0x22,
    CollateralGainMovedToPosition = 0x23,

    // Offset Events (0x30 - 0x3F)
    Offset = 0x30,

    // Accumulator Events (0x40 - 0x4F)
    ProductUpdated = 0x40,
    SumUpdated = 0x41,
    EpochUpdated = 0x42,
    ScaleUpdated = 0x43,

    // Balance Events (0x50 - 0x5F)
    TotalDepositsUpdated = 0x50,
    CollateralBalanceUpdated = 0x51,
}

/// All events the stability pool can emit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolEvent {
    // ============ Depositor Events ============

    /// A depositor's principal was re-anchored
    DepositUpdated { depositor: Address, amount: Decimal },

    /// A depositor's snapshot was taken (all zero when the record is cleared)
    DepositSnapshotUpdated {
        depositor: Address,
        p: Decimal,
        s: Decimal,
        epoch: u64,
        scale: u64,
    },

    /// Collateral gain paid out to a depositor
    CollateralGainWithdrawn {
        depositor: Address,
        collateral: Decimal,
        debt_loss: Decimal,
    },

    /// Collateral gain sent to the depositor's position instead of their wallet
    CollateralGainMovedToPosition {
        depositor: Address,
        position: Address,
        collateral: Decimal,
    },

    // ============ Offset Events ============

    /// A liquidation was offset against the pool
    Offset {
        debt_offset: Decimal,
        collateral_to_pool: Decimal,
        debt_to_redistribute: Decimal,
        collateral_to_redistribute: Decimal,
    },

    // ============ Accumulator Events ============

    /// Running product `P` changed
    ProductUpdated { p: Decimal },

    /// `S[epoch][scale]` changed
    SumUpdated { epoch: u64, scale: u64, sum: Decimal },

    /// Pool was emptied and a new epoch started
    EpochUpdated { epoch: u64 },

    /// `P` was rescaled
    ScaleUpdated { scale: u64 },

    // ============ Balance Events ============

    TotalDepositsUpdated { total: Decimal },

    CollateralBalanceUpdated { total: Decimal },
}

impl PoolEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::DepositUpdated { .. } => EventType::DepositUpdated,
            Self::DepositSnapshotUpdated { .. } => EventType::DepositSnapshotUpdated,
            Self::CollateralGainWithdrawn { .. } => EventType::CollateralGainWithdrawn,
            Self::CollateralGainMovedToPosition { .. } => EventType::CollateralGainMovedToPosition,
            Self::Offset { .. } => EventType::Offset,
            Self::ProductUpdated { .. } => EventType::ProductUpdated,
            Self::SumUpdated { .. } => EventType::SumUpdated,
            Self::EpochUpdated { .. } => EventType::EpochUpdated,
            Self::ScaleUpdated { .. } => EventType::ScaleUpdated,
            Self::TotalDepositsUpdated { .. } => EventType::TotalDepositsUpdated,
            Self::CollateralBalanceUpdated { .. } => EventType::CollateralBalanceUpdated,
        }
    }

    /// Depositor the event concerns, if any
    pub fn depositor(&self) -> Option<&Address> {
        match self {
            Self::DepositUpdated { depositor, .. }
            | Self::DepositSnapshotUpdated { depositor, .. }
            | Self::CollateralGainWithdrawn { depositor, .. }
            | Self::CollateralGainMovedToPosition { depositor, .. } => Some(depositor),
            _ => None,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<PoolEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: PoolEvent) {
        log::trace!("event {:?}", event.event_type());
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Remove and return every event collected so far
    pub fn drain(&mut self) -> Vec<PoolEvent> {
        core::mem::take(&mut self.events)
    }

    /// Drop events emitted after the log held `len` entries
    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&PoolEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
