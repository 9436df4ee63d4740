//! Mathematical Utilities
//!
//! Checked 256-bit helpers. Every division truncates toward zero.

use alloy_primitives::U256;

use crate::constants::stats::BPS_DENOMINATOR;
use crate::errors::{PoolError, PoolResult};

/// `a * b / denominator`, truncated
pub fn mul_div(a: U256, b: U256, denominator: U256) -> PoolResult<U256> {
    mul_div_rem(a, b, denominator).map(|(quotient, _)| quotient)
}

/// `a * b / denominator` together with the remainder of the division
pub fn mul_div_rem(a: U256, b: U256, denominator: U256) -> PoolResult<(U256, U256)> {
    if denominator.is_zero() {
        return Err(PoolError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(PoolError::Overflow)?;
    Ok((product / denominator, product % denominator))
}

/// `numerator / denominator` with the remainder
pub fn div_rem(numerator: U256, denominator: U256) -> PoolResult<(U256, U256)> {
    if denominator.is_zero() {
        return Err(PoolError::DivisionByZero);
    }
    Ok((numerator / denominator, numerator % denominator))
}

/// Ratio of `part` to `whole` in basis points, saturating at `u64::MAX`
///
/// A zero `whole` reports full coverage.
pub fn ratio_bps(part: U256, whole: U256) -> u64 {
    if whole.is_zero() {
        return BPS_DENOMINATOR;
    }
    let scaled = part.saturating_mul(U256::from(BPS_DENOMINATOR)) / whole;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
