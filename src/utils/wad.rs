//! Fixed-point "wad" arithmetic for on-chain amounts.
//!
//! A wad is an unsigned integer scaled by 10^18, the standard amount
//! representation on the ledger. All reserve and trade-size math runs on
//! integers with floor truncation so results match on-chain rounding exactly;
//! intermediates widen to 512 bits so nothing is lost before the final floor.

use ethers_core::types::{U256, U512};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const WAD_RAW: u64 = 1_000_000_000_000_000_000;

/// An amount scaled by 10^18, backed by a 256-bit unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Wad(U256);

impl Wad {
    pub const ZERO: Wad = Wad(U256([0, 0, 0, 0]));
    /// 1.0 in wad units.
    pub const ONE: Wad = Wad(U256([WAD_RAW, 0, 0, 0]));

    /// Wrap a raw 10^18-scaled integer.
    pub fn from_raw(raw: U256) -> Self {
        Wad(raw)
    }

    /// A whole number of tokens.
    pub fn from_int(n: u64) -> Self {
        Wad(U256::from(n) * Self::ONE.0)
    }

    /// Convert a non-negative decimal, truncating below 10^-18.
    ///
    /// Returns `None` for negative values or values too large for the
    /// decimal's 96-bit mantissa to carry at wad scale.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() {
            return None;
        }
        let scaled = value.checked_mul(Decimal::from(WAD_RAW))?;
        let raw = scaled.trunc().to_u128()?;
        Some(Wad(U256::from(raw)))
    }

    pub fn raw(self) -> U256 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Wad) -> Option<Wad> {
        self.0.checked_add(rhs.0).map(Wad)
    }

    pub fn checked_sub(self, rhs: Wad) -> Option<Wad> {
        self.0.checked_sub(rhs.0).map(Wad)
    }

    pub fn saturating_sub(self, rhs: Wad) -> Wad {
        Wad(self.0.saturating_sub(rhs.0))
    }

    /// Wad multiplication: `a * b / 10^18`, floored.
    ///
    /// `None` only if the result itself overflows 256 bits.
    pub fn wmul(self, rhs: Wad) -> Option<Wad> {
        narrow(self.0.full_mul(rhs.0) / U512::from(Self::ONE.0)).map(Wad)
    }

    /// Wad division: `a * 10^18 / b`, floored.
    ///
    /// `None` on division by zero or 256-bit overflow of the quotient.
    pub fn wdiv(self, rhs: Wad) -> Option<Wad> {
        if rhs.is_zero() {
            return None;
        }
        let wide = U512::from(self.0) * U512::from(Self::ONE.0);
        narrow(wide / U512::from(rhs.0)).map(Wad)
    }
}

/// Apply a percentage markup (positive) or discount (negative) to a value.
///
/// `apply_percent(100, 10) == 110`, `apply_percent(100, -10) == 90`.
/// Returns `None` if the percent takes the factor below zero or the
/// arithmetic overflows.
pub fn apply_percent(value: Wad, percent: Decimal) -> Option<Wad> {
    let factor = Decimal::ONE + percent.checked_div(Decimal::from(100u8))?;
    value.wmul(Wad::from_decimal(factor)?)
}

/// Integer square root over a 512-bit product.
///
/// Babylonian iteration on the unscaled integer; the root of any 512-bit
/// value fits in 256 bits. Floors, matching on-chain semantics.
pub fn isqrt(n: U512) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    // Initial guess >= sqrt(n), so the sequence decreases monotonically.
    let mut x = U512::one() << ((n.bits() + 1) / 2);
    let mut y = (x + n / x) >> 1;
    while y < x {
        x = y;
        y = (x + n / x) >> 1;
    }
    narrow(x).unwrap_or_else(U256::max_value)
}

/// Truncate a 512-bit value back to 256 bits, `None` on overflow.
pub(crate) fn narrow(wide: U512) -> Option<U256> {
    let limbs = wide.0;
    if limbs[4] | limbs[5] | limbs[6] | limbs[7] != 0 {
        return None;
    }
    Some(U256([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let one = Self::ONE.0;
        let int = self.0 / one;
        let frac = (self.0 % one).low_u64();
        if frac == 0 {
            write!(f, "{}", int)
        } else {
            let digits = format!("{:018}", frac);
            write!(f, "{}.{}", int, digits.trim_end_matches('0'))
        }
    }
}

impl Serialize for Wad {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Wad {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Wad {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s).map_err(|e| format!("invalid amount '{}': {}", s, e))?;
        Wad::from_decimal(value).ok_or_else(|| format!("amount out of range: '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_int_and_raw() {
        assert_eq!(Wad::from_int(1), Wad::ONE);
        assert_eq!(Wad::from_int(0), Wad::ZERO);
        assert_eq!(Wad::from_int(2).raw(), U256::from(2_000_000_000_000_000_000u64));
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Wad::from_decimal(dec!(1.5)), Some(Wad::from_raw(U256::from(1_500_000_000_000_000_000u64))));
        assert_eq!(Wad::from_decimal(dec!(0)), Some(Wad::ZERO));
        assert_eq!(Wad::from_decimal(dec!(-1)), None);
        // Truncation below 10^-18
        assert_eq!(
            Wad::from_decimal(dec!(0.0000000000000000019)),
            Some(Wad::from_raw(U256::from(1u64)))
        );
    }

    #[test]
    fn test_wmul_floors() {
        let third = Wad::ONE.wdiv(Wad::from_int(3)).unwrap();
        // 1/3 * 3 loses the last ulp to truncation
        let back = third.wmul(Wad::from_int(3)).unwrap();
        assert_eq!(back.raw(), Wad::ONE.raw() - U256::one());

        assert_eq!(Wad::from_int(2).wmul(Wad::from_int(3)), Some(Wad::from_int(6)));
    }

    #[test]
    fn test_wdiv_by_zero() {
        assert_eq!(Wad::ONE.wdiv(Wad::ZERO), None);
    }

    #[test]
    fn test_wmul_large_reserves_no_precision_loss() {
        // 10^9 tokens * 10^9 tokens stays exact at full width
        let billion = Wad::from_int(1_000_000_000);
        let product = billion.wmul(billion).unwrap();
        assert_eq!(product, Wad::from_int(1_000_000_000_000_000_000));
    }

    #[test]
    fn test_apply_percent() {
        let hundred = Wad::from_int(100);
        assert_eq!(apply_percent(hundred, dec!(10)), Some(Wad::from_int(110)));
        assert_eq!(apply_percent(hundred, dec!(-10)), Some(Wad::from_int(90)));
        assert_eq!(apply_percent(hundred, dec!(0)), Some(hundred));
        // A discount past -100% has no meaning
        assert_eq!(apply_percent(hundred, dec!(-150)), None);
    }

    #[test]
    fn test_isqrt_exact_squares() {
        assert_eq!(isqrt(U512::zero()), U256::zero());
        assert_eq!(isqrt(U512::one()), U256::one());
        assert_eq!(isqrt(U512::from(4u64)), U256::from(2u64));
        assert_eq!(isqrt(U512::from(144u64)), U256::from(12u64));
        let big = U512::from(10u64).pow(U512::from(40u64));
        assert_eq!(isqrt(big), U256::from(10u64).pow(U256::from(20u64)));
    }

    #[test]
    fn test_isqrt_floors() {
        assert_eq!(isqrt(U512::from(2u64)), U256::one());
        assert_eq!(isqrt(U512::from(3u64)), U256::one());
        assert_eq!(isqrt(U512::from(8u64)), U256::from(2u64));
        assert_eq!(isqrt(U512::from(99u64)), U256::from(9u64));
    }

    #[test]
    fn test_isqrt_bracketing_property() {
        let samples = [
            U512::from(7u64),
            U512::from(123_456_789u64),
            U512::from(u64::MAX),
            U512::from(U256::max_value()),
            U512::from(U256::max_value()) * U512::from(3u64),
        ];
        for n in samples {
            let r = U512::from(isqrt(n));
            assert!(r * r <= n);
            assert!((r + U512::one()) * (r + U512::one()) > n);
        }
    }

    #[test]
    fn test_display_trims_trailing_zeros() {
        assert_eq!(Wad::from_int(5).to_string(), "5");
        assert_eq!(Wad::from_decimal(dec!(1.25)).unwrap().to_string(), "1.25");
        assert_eq!(
            Wad::from_raw(U256::from(1u64)).to_string(),
            "0.000000000000000001"
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let w: Wad = "48.808848".parse().unwrap();
        assert_eq!(w.to_string(), "48.808848");
        assert!("-1".parse::<Wad>().is_err());
        assert!("abc".parse::<Wad>().is_err());
    }
}
