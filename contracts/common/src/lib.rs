//! Stability Pool Common Library
//!
//! Shared types, constants and utilities for the stability pool crates:
//!
//! - **Decimal**: 18-decimal fixed point over `U256`, truncating division
//! - **Errors**: typed `PoolError` with stable codes
//! - **Events**: indexable record of every observable state transition
//! - **Ledger**: the value-transfer collaborator and an in-memory ledger

pub mod constants;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod math;
pub mod types;

// Re-exports for convenience
pub use alloy_primitives::U256;
pub use constants::*;
pub use decimal::Decimal;
pub use errors::*;
pub use events::*;
pub use ledger::*;
pub use math::*;
pub use types::*;
