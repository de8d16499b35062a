//! Non-negative monetary amounts with two fractional digits.

use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A price or total in minor units (cents).
///
/// Serializes as a decimal string (`"120.00"`); deserializes from either a
/// decimal string or a JSON number, since catalog feeds send both.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn from_major(units: u64) -> Self {
        Self(units * 100)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Parse a decimal amount such as `"120"`, `"120.5"` or `"120.50"`.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(DomainError::validation("amount cannot be empty"));
        }
        if s.starts_with('-') {
            return Err(DomainError::validation(format!(
                "amount cannot be negative: {s}"
            )));
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if frac.len() > 2 {
            return Err(DomainError::validation(format!(
                "amount has more than two decimal places: {s}"
            )));
        }
        let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(DomainError::validation(format!("invalid amount: {s}")));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| DomainError::validation(format!("amount out of range: {s}")))?
        };
        let frac: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().unwrap_or(0) * 10,
            _ => frac.parse::<u64>().unwrap_or(0),
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .map(Self)
            .ok_or_else(|| DomainError::validation(format!("amount out of range: {s}")))
    }

    /// Convert a floating point amount, rounding to the nearest cent.
    pub fn from_f64(value: f64) -> DomainResult<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::validation(format!("invalid amount: {value}")));
        }
        let cents = (value * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(DomainError::validation(format!("amount out of range: {value}")));
        }
        Ok(Self(cents as u64))
    }

    /// Multiply by a quantity. `None` on overflow.
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(u64::from(quantity)).map(Self)
    }

    /// Multiply by a quantity, saturating at the maximum representable amount.
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(u64),
            Float(f64),
        }

        let money = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Money::parse(&s),
            Raw::Integer(units) => units
                .checked_mul(100)
                .map(Money)
                .ok_or_else(|| DomainError::validation("amount out of range")),
            Raw::Float(v) => Money::from_f64(v),
        };
        money.map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_common_decimal_forms() {
        assert_eq!(Money::parse("120").unwrap(), Money::from_cents(12_000));
        assert_eq!(Money::parse("120.5").unwrap(), Money::from_cents(12_050));
        assert_eq!(Money::parse("120.05").unwrap(), Money::from_cents(12_005));
        assert_eq!(Money::parse(".5").unwrap(), Money::from_cents(50));
        assert_eq!(Money::parse(" 7. ").unwrap(), Money::from_cents(700));
    }

    #[test]
    fn rejects_negative_and_malformed_amounts() {
        for bad in ["", "-1", "1.234", "abc", "1,50", ".", "1.2.3"] {
            assert!(
                matches!(Money::parse(bad), Err(DomainError::Validation(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Money::from_cents(24_000).to_string(), "240.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn deserializes_from_string_and_number() {
        let a: Money = serde_json::from_str("\"120.00\"").unwrap();
        let b: Money = serde_json::from_str("120.0").unwrap();
        let c: Money = serde_json::from_str("120").unwrap();
        assert_eq!(a, Money::from_major(120));
        assert_eq!(b, a);
        assert_eq!(c, a);
        assert!(serde_json::from_str::<Money>("-3.5").is_err());
    }

    #[test]
    fn times_and_sum() {
        let unit = Money::parse("120.00").unwrap();
        assert_eq!(unit.times(2), Money::from_major(240));
        let total: Money = [unit, unit.times(3)].into_iter().sum();
        assert_eq!(total, Money::from_major(480));
        assert_eq!(Money::from_cents(u64::MAX).checked_times(2), None);
    }

    proptest! {
        #[test]
        fn display_then_parse_is_identity(cents in 0u64..10_000_000_000u64) {
            let m = Money::from_cents(cents);
            prop_assert_eq!(Money::parse(&m.to_string()).unwrap(), m);
        }
    }
}
