//! Monetary amounts with exact, cent-level precision.

use core::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use bankcore_core::{DomainError, DomainResult, ValueObject};

/// Number of fractional digits every amount is kept at.
pub const SCALE: u32 = 2;

/// Largest magnitude in cents: 18 integer digits plus 2 fractional, the range of
/// a `NUMERIC(20, 2)` column.
const MAX_CENTS: i128 = 99_999_999_999_999_999_999;

/// A monetary amount, always held at exactly two fractional digits.
///
/// Construction rounds to the nearest cent with midpoints going away from zero
/// (`0.005 -> 0.01`, `-0.005 -> -0.01`). Zero and negatives are accepted;
/// positivity is the caller's rule to enforce. Values whose magnitude exceeds
/// [`Money::max`] after rounding are rejected, and so is arithmetic that would
/// leave that range.
///
/// On the wire an amount is a decimal string (`"19.99"`). Deserialization also
/// accepts JSON numbers and canonicalizes them the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl ValueObject for Money {}

impl Money {
    pub fn new(value: Decimal) -> DomainResult<Self> {
        let rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
        if rounded.abs() > Self::max().0 {
            return Err(DomainError::validation(format!(
                "amount {value} is outside the supported range"
            )));
        }
        Ok(Self(canonicalize(rounded)))
    }

    /// Build an amount from a float, rounding to cents.
    ///
    /// Fails for NaN, infinities and values outside the supported range.
    pub fn from_f64(value: f64) -> DomainResult<Self> {
        Decimal::from_f64(value)
            .ok_or_else(|| DomainError::validation(format!("amount {value} is not representable")))
            .and_then(Self::new)
    }

    /// Build an amount from a whole number of cents. Every `i64` fits.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, SCALE))
    }

    pub fn zero() -> Self {
        Self::from_cents(0)
    }

    /// Largest representable amount, `999999999999999999.99`.
    pub fn max() -> Self {
        Self(Decimal::from_i128_with_scale(MAX_CENTS, SCALE))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn add(self, other: Money) -> DomainResult<Money> {
        self.0
            .checked_add(other.0)
            .ok_or_else(|| overflow("addition"))
            .and_then(Money::new)
    }

    pub fn subtract(self, other: Money) -> DomainResult<Money> {
        self.0
            .checked_sub(other.0)
            .ok_or_else(|| overflow("subtraction"))
            .and_then(Money::new)
    }

    pub fn multiply(self, factor: Decimal) -> DomainResult<Money> {
        self.0
            .checked_mul(factor)
            .ok_or_else(|| overflow("multiplication"))
            .and_then(Money::new)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

fn overflow(op: &str) -> DomainError {
    DomainError::validation(format!("amount {op} overflowed"))
}

// Input is already rounded to SCALE and within range.
fn canonicalize(mut value: Decimal) -> Decimal {
    value.rescale(SCALE);
    if value.is_zero() {
        // -0.00 and 0.00 must print the same.
        value.set_sign_positive(true);
    }
    value
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| DomainError::validation(format!("invalid amount '{s}': {e}")))?;
        Money::new(value)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn money(value: Decimal) -> Money {
        Money::new(value).unwrap()
    }

    #[test]
    fn rounds_up_to_the_next_cent() {
        assert_eq!(Money::from_f64(19.999).unwrap().amount(), dec!(20.00));
        assert_eq!(Money::from_f64(19.999).unwrap().to_string(), "20.00");
    }

    #[test]
    fn midpoints_round_away_from_zero() {
        assert_eq!(money(dec!(0.005)).amount(), dec!(0.01));
        assert_eq!(money(dec!(0.015)).amount(), dec!(0.02));
        assert_eq!(money(dec!(0.025)).amount(), dec!(0.03));
        assert_eq!(money(dec!(-0.005)).amount(), dec!(-0.01));
        assert_eq!(money(dec!(0.0049)).amount(), dec!(0.00));
    }

    #[test]
    fn always_displays_two_decimals() {
        assert_eq!(money(dec!(7)).to_string(), "7.00");
        assert_eq!(money(dec!(7.5)).to_string(), "7.50");
        assert_eq!(money(dec!(-0.001)).to_string(), "0.00");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn accepts_zero_and_negative_values() {
        assert!(money(dec!(0)).is_zero());
        assert!(money(dec!(-12.34)).is_negative());
        assert!(!money(dec!(-12.34)).is_positive());
    }

    #[test]
    fn rejects_non_finite_floats() {
        assert!(Money::from_f64(f64::NAN).is_err());
        assert!(Money::from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn range_stops_at_numeric_20_2() {
        let max = Money::max();
        assert_eq!(max.to_string(), "999999999999999999.99");
        assert_eq!(max.amount().scale(), SCALE);
        assert_eq!(money(dec!(999999999999999999.99)), max);
        assert_eq!(money(dec!(-999999999999999999.99)).amount(), -max.amount());

        assert!(Money::new(dec!(1000000000000000000.00)).is_err());
        // Rounds past the limit.
        assert!(Money::new(dec!(999999999999999999.995)).is_err());
        assert!(Money::new(Decimal::MAX).is_err());
        assert!(Money::new(Decimal::MIN).is_err());
        assert!("79228162514264337593543950335".parse::<Money>().is_err());
        assert!(serde_json::from_value::<Money>(serde_json::json!("1e19")).is_err());
    }

    #[test]
    fn arithmetic_leaving_the_range_is_an_error() {
        let max = Money::max();

        assert!(max.add(Money::from_cents(1)).is_err());
        assert!(max.add(max).is_err());
        assert!(money(-max.amount()).subtract(Money::from_cents(1)).is_err());
        assert!(max.multiply(dec!(2)).is_err());
        assert!(max.multiply(Decimal::MAX).is_err());
        assert_eq!(max.subtract(max).unwrap(), Money::zero());
    }

    #[test]
    fn arithmetic_returns_new_canonical_values() {
        let a = money(dec!(10.10));
        let b = money(dec!(0.25));

        assert_eq!(a.add(b).unwrap(), money(dec!(10.35)));
        assert_eq!(a.subtract(b).unwrap(), money(dec!(9.85)));
        assert_eq!(a.multiply(dec!(1.5)).unwrap(), money(dec!(15.15)));
        assert_eq!(money(dec!(0.10)).multiply(dec!(0.333)).unwrap(), money(dec!(0.03)));
        // Operands are untouched.
        assert_eq!(a, money(dec!(10.10)));
    }

    #[test]
    fn ordering_follows_numeric_value() {
        let small = Money::from_cents(99);
        let large = Money::from_cents(100);

        assert!(small < large);
        assert!(large > small);
        assert_eq!(money(dec!(1.0)), money(dec!(1.00)));
    }

    #[test]
    fn parses_strings() {
        assert_eq!("12.345".parse::<Money>().unwrap(), money(dec!(12.35)));
        assert!("twelve".parse::<Money>().is_err());
    }

    #[test]
    fn serde_uses_canonical_decimal_strings() {
        let json = serde_json::to_value(money(dec!(3.1))).unwrap();
        assert_eq!(json, serde_json::json!("3.10"));

        let from_number: Money = serde_json::from_value(serde_json::json!(2.499)).unwrap();
        assert_eq!(from_number, money(dec!(2.50)));

        let from_string: Money = serde_json::from_value(serde_json::json!("2.005")).unwrap();
        assert_eq!(from_string, money(dec!(2.01)));
    }

    proptest! {
        /// Canonical amounts never carry more than two fractional digits.
        #[test]
        fn canonical_scale_is_two(mantissa in -1_000_000_000i64..1_000_000_000i64, scale in 0u32..8) {
            let money = Money::new(Decimal::new(mantissa, scale)).unwrap();
            prop_assert_eq!(money.amount().scale(), SCALE);
        }

        /// Cent-exact addition and subtraction are inverse operations.
        #[test]
        fn add_then_subtract_is_identity(a in -10_000_000i64..10_000_000i64, b in -10_000_000i64..10_000_000i64) {
            let x = Money::from_cents(a);
            let y = Money::from_cents(b);
            prop_assert_eq!(x.add(y).unwrap().subtract(y).unwrap(), x);
        }
    }
}
