//! Protocol Constants
//!
//! Fixed-point precision and the compounding parameters of the product-sum
//! accumulator. Values follow Liquity's Stability Pool.

use alloy_primitives::U256;

/// Fixed-point precision
pub mod precision {
    use super::U256;

    /// 1.0 in 18-decimal fixed point
    pub const DECIMAL_PRECISION: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

    /// Same value as a plain integer, for test fixtures
    pub const DECIMAL_PRECISION_U128: u128 = 1_000_000_000_000_000_000;
}

/// Product-sum accumulator parameters
pub mod pool {
    use super::U256;

    /// When `P` drops below this raw value it is multiplied back up by the
    /// same factor and the scale counter advances
    pub const SCALE_FACTOR: U256 = U256::from_limbs([1_000_000_000, 0, 0, 0]);

    /// A compounded deposit smaller than `initial_deposit / DUST_DIVISOR`
    /// is treated as fully consumed
    pub const DUST_DIVISOR: U256 = U256::from_limbs([1_000_000_000, 0, 0, 0]);

    /// Largest scale gap across which a deposit still has value
    pub const MAX_SCALE_GAP: u64 = 1;

    /// Epoch and scale of a freshly created pool
    pub const INITIAL_EPOCH: u64 = 0;
    pub const INITIAL_SCALE: u64 = 0;
}

/// Reporting
pub mod stats {
    /// Basis points denominator (100% = 10_000)
    pub const BPS_DENOMINATOR: u64 = 10_000;
}

/// Domain tags used when deriving pool account ids
pub mod domains {
    pub const STABILITY_POOL: &[u8] = b"stability-pool";
    pub const ACTIVE_POOL: &[u8] = b"active-pool";
    pub const DEFAULT_POOL: &[u8] = b"default-pool";
}
