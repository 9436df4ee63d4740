//! Error Types for the Stability Pool
//!
//! Typed errors with stable codes for logging and for hosts that need to map
//! failures onto their own transaction receipts.

use core::fmt;

use crate::decimal::Decimal;
use crate::types::Address;

/// Result type alias for stability pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Main error enum for the stability pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    // ============ Amount Errors ============
    /// Invalid amount provided
    InvalidAmount { amount: Decimal, reason: AmountErrorReason },

    /// Insufficient balance for operation
    InsufficientBalance { available: Decimal, requested: Decimal },

    /// Zero amount not allowed
    ZeroAmount,

    // ============ Stability Pool Errors ============
    /// Deposit not found for depositor
    DepositNotFound { depositor: Address },

    /// No collateral gain to claim
    NoRewardsToClaim,

    /// Offset attempted against a pool with no deposits
    EmptyPool,

    // ============ Ledger Errors ============
    /// Value transfer rejected by the ledger
    TransferFailed { from: Address, to: Address, amount: Decimal },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    /// Division by zero
    DivisionByZero,

    // ============ Input Validation Errors ============
    /// Invalid input parameter
    InvalidInput { param: &'static str, reason: &'static str },

    /// Invalid address (e.g., zero address)
    InvalidAddress { reason: &'static str },

    // ============ State Errors ============
    /// Invalid state transition
    InvalidStateTransition,

    /// Persisted state could not be decoded
    DecodeFailed,

    /// Pool lock was poisoned by a panicking holder
    LockPoisoned,
}

/// Reasons for amount-related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountErrorReason {
    /// Amount is zero when non-zero required
    Zero,
    /// Amount exceeds maximum
    TooLarge,
}

impl PoolError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "E010_INVALID_AMOUNT",
            Self::InsufficientBalance { .. } => "E011_INSUFFICIENT_BALANCE",
            Self::ZeroAmount => "E014_ZERO_AMOUNT",
            Self::DepositNotFound { .. } => "E051_DEPOSIT_NOT_FOUND",
            Self::NoRewardsToClaim => "E052_NO_REWARDS",
            Self::EmptyPool => "E053_EMPTY_POOL",
            Self::TransferFailed { .. } => "E070_TRANSFER_FAILED",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
            Self::InvalidInput { .. } => "E090_INVALID_INPUT",
            Self::InvalidAddress { .. } => "E091_INVALID_ADDRESS",
            Self::InvalidStateTransition => "E101_INVALID_STATE",
            Self::DecodeFailed => "E102_DECODE_FAILED",
            Self::LockPoisoned => "E103_LOCK_POISONED",
        }
    }

    /// Returns true if this error is recoverable (user can fix it)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientBalance { .. }
                | Self::ZeroAmount
                | Self::InvalidAmount { .. }
                | Self::NoRewardsToClaim
        )
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount { amount, reason } => {
                write!(f, "{}: invalid amount {amount} ({reason:?})", self.code())
            }
            Self::InsufficientBalance { available, requested } => write!(
                f,
                "{}: requested {requested}, available {available}",
                self.code()
            ),
            Self::DepositNotFound { depositor } => {
                write!(f, "{}: no deposit for {}", self.code(), crate::types::short_hex(depositor))
            }
            Self::TransferFailed { from, to, amount } => write!(
                f,
                "{}: {amount} from {} to {}",
                self.code(),
                crate::types::short_hex(from),
                crate::types::short_hex(to)
            ),
            Self::InvalidInput { param, reason } => {
                write!(f, "{}: {param}: {reason}", self.code())
            }
            Self::InvalidAddress { reason } => write!(f, "{}: {reason}", self.code()),
            _ => f.write_str(self.code()),
        }
    }
}

impl std::error::Error for PoolError {}
