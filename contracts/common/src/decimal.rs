//! Fixed-Point Decimal
//!
//! Every monetary quantity in the pool (debt token, collateral, P, S and the
//! error carries) is an unsigned 256-bit integer scaled by 10^18. All
//! division truncates toward zero.
//!
//! ```text
//! 1 token      = Decimal::ONE      = 1_000_000_000_000_000_000 raw
//! 0.5 token    = Decimal::parse("0.5")
//! 1 wei        = Decimal::from_wei(1)
//! ```

use core::fmt;
use core::str::FromStr;

use alloy_primitives::U256;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::precision::DECIMAL_PRECISION;
use crate::errors::{PoolError, PoolResult};

/// Number of fractional digits carried by [`Decimal`]
pub const DECIMALS: usize = 18;

/// 18-decimal fixed-point amount backed by a `U256`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Decimal(U256);

impl Decimal {
    /// 0
    pub const ZERO: Self = Self(U256::ZERO);

    /// 1.0 (10^18 raw units)
    pub const ONE: Self = Self(DECIMAL_PRECISION);

    /// Wrap a raw, already-scaled value
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Amount expressed in the smallest unit (wei)
    pub fn from_wei(wei: u128) -> Self {
        Self(U256::from(wei))
    }

    /// Whole token units, e.g. `from_units(100)` is 100.0
    pub fn from_units(units: u64) -> Self {
        Self(U256::from(units) * DECIMAL_PRECISION)
    }

    /// Parse a decimal string such as `"66.5"` or `"0.000000001"`
    pub fn parse(s: &str) -> PoolResult<Self> {
        s.parse()
    }

    /// The raw 10^18-scaled integer
    pub const fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Raw value as u128, if it fits
    pub fn to_wei(&self) -> Option<u128> {
        u128::try_from(self.0).ok()
    }

    pub fn checked_add(self, rhs: Self) -> PoolResult<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(PoolError::Overflow)
    }

    pub fn checked_sub(self, rhs: Self) -> PoolResult<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(PoolError::Underflow)
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// `self * mul / div`, truncated
    pub fn mul_div(self, mul: Self, div: Self) -> PoolResult<Self> {
        crate::math::mul_div(self.0, mul.0, div.0).map(Self)
    }

    /// Fixed-point product: `self * rhs / 10^18`
    pub fn mul_fixed(self, rhs: Self) -> PoolResult<Self> {
        self.mul_div(rhs, Self::ONE)
    }

    /// Fixed-point quotient: `self * 10^18 / rhs`
    pub fn div_fixed(self, rhs: Self) -> PoolResult<Self> {
        self.mul_div(Self::ONE, rhs)
    }

    /// Absolute difference, used for tolerance checks
    pub fn abs_diff(self, other: Self) -> Self {
        if self >= other {
            Self(self.0 - other.0)
        } else {
            Self(other.0 - self.0)
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / DECIMAL_PRECISION;
        let frac = self.0 % DECIMAL_PRECISION;
        if frac.is_zero() {
            return write!(f, "{int}");
        }
        let digits = format!("{:0>width$}", frac.to_string(), width = DECIMALS);
        write!(f, "{int}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Decimal {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = PoolError::InvalidInput {
            param: "decimal",
            reason: "expected digits with at most 18 fractional places",
        };

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid);
        }
        if frac_part.len() > DECIMALS
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid);
        }

        let int = if int_part.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(int_part, 10).map_err(|_| invalid.clone())?
        };

        let frac = if frac_part.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{:0<width$}", frac_part, width = DECIMALS);
            U256::from_str_radix(&padded, 10).map_err(|_| invalid.clone())?
        };

        int.checked_mul(DECIMAL_PRECISION)
            .and_then(|scaled| scaled.checked_add(frac))
            .map(Self)
            .ok_or(PoolError::Overflow)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// Fixed-width encoding: four little-endian u64 limbs
impl BorshSerialize for Decimal {
    fn serialize<W: borsh::io::Write>(&self, writer: &mut W) -> borsh::io::Result<()> {
        BorshSerialize::serialize(self.0.as_limbs(), writer)
    }
}

impl BorshDeserialize for Decimal {
    fn deserialize_reader<R: borsh::io::Read>(reader: &mut R) -> borsh::io::Result<Self> {
        let limbs = <[u64; 4]>::deserialize_reader(reader)?;
        Ok(Self(U256::from_limbs(limbs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_is_ten_to_the_eighteenth() {
        assert_eq!(Decimal::ONE.to_wei(), Some(1_000_000_000_000_000_000));
        assert_eq!(Decimal::from_units(100), Decimal::from_wei(100_000_000_000_000_000_000));
    }

    #[test]
    fn test_parse_and_display() {
        let d = Decimal::parse("66.666666666666666666").unwrap();
        assert_eq!(d.to_wei(), Some(66_666_666_666_666_666_666));
        assert_eq!(d.to_string(), "66.666666666666666666");

        assert_eq!(Decimal::parse("0.5").unwrap().to_string(), "0.5");
        assert_eq!(Decimal::parse("100").unwrap(), Decimal::from_units(100));
        assert_eq!(Decimal::parse(".25").unwrap().to_wei(), Some(250_000_000_000_000_000));
        assert_eq!(Decimal::from_wei(1).to_string(), "0.000000000000000001");
        assert_eq!(Decimal::ZERO.to_string(), "0");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Decimal::parse("").is_err());
        assert!(Decimal::parse(".").is_err());
        assert!(Decimal::parse("1.2.3").is_err());
        assert!(Decimal::parse("-1").is_err());
        assert!(Decimal::parse("0.0000000000000000001").is_err());
    }

    #[test]
    fn test_mul_div_truncates() {
        let hundred = Decimal::from_units(100);
        let third = hundred.mul_div(Decimal::from_wei(1), Decimal::from_wei(3)).unwrap();
        assert_eq!(third.to_wei(), Some(33_333_333_333_333_333_333));

        let half = Decimal::ONE.div_fixed(Decimal::from_units(2)).unwrap();
        assert_eq!(half, Decimal::parse("0.5").unwrap());
        assert_eq!(hundred.mul_fixed(half).unwrap(), Decimal::from_units(50));
    }

    #[test]
    fn test_checked_ops() {
        assert_eq!(
            Decimal::ZERO.checked_sub(Decimal::ONE),
            Err(PoolError::Underflow)
        );
        assert_eq!(
            Decimal::from_raw(U256::MAX).checked_add(Decimal::from_wei(1)),
            Err(PoolError::Overflow)
        );
        assert_eq!(Decimal::ONE.mul_div(Decimal::ONE, Decimal::ZERO), Err(PoolError::DivisionByZero));
        assert_eq!(Decimal::ZERO.saturating_sub(Decimal::ONE), Decimal::ZERO);
    }

    #[test]
    fn test_borsh_is_fixed_width() {
        let d = Decimal::parse("123.456").unwrap();
        let bytes = borsh::to_vec(&d).unwrap();
        assert_eq!(bytes.len(), 32);
        let back: Decimal = borsh::from_slice(&bytes).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_serde_uses_decimal_string() {
        let d = Decimal::parse("0.333333333333333333").unwrap();
        let mut buf = Vec::new();
        ciborium::into_writer(&d, &mut buf).unwrap();
        let back: Decimal = ciborium::from_reader(buf.as_slice()).unwrap();
        assert_eq!(back, d);
    }
}
