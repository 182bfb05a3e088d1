//! Money type for ledger amounts
//!
//! Amounts are held as a signed count of cents so running balances are exact
//! integer sums. Values enter the system as decimal strings (CSV cells) or
//! JSON numbers (the ground-truth mapping) and leave it as two-decimal strings.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};

/// A monetary amount in cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use statement_ledger::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// assert_eq!(amount.to_decimal_string(), "10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole currency units
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Sum of two amounts, or `None` if it leaves the representable range
    ///
    /// The range is symmetric, `i64::MIN` cents excluded, so any amount can
    /// be negated.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        Self::in_range(self.0.checked_add(other.0))
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        Self::in_range(self.0.checked_sub(other.0))
    }

    fn in_range(cents: Option<i64>) -> Option<Self> {
        cents.filter(|c| *c != i64::MIN).map(Self)
    }

    /// The positive part of the amount, or zero
    pub fn positive_part(&self) -> Self {
        Self(self.0.max(0))
    }

    /// The negated negative part of the amount, or zero
    pub fn negative_part(&self) -> Self {
        Self((-self.0).max(0))
    }

    /// Convert a float amount, rounding to the nearest cent
    pub fn from_f64(value: f64) -> Result<Self, MoneyParseError> {
        if !value.is_finite() {
            return Err(MoneyParseError::InvalidFormat(value.to_string()));
        }
        let cents = (value * 100.0).round();
        if cents.abs() >= i64::MAX as f64 {
            return Err(MoneyParseError::OutOfRange(value.to_string()));
        }
        Ok(Self(cents as i64))
    }

    /// Parse a decimal amount such as "10.5", "-0.29", "+3" or "1234.567"
    ///
    /// Digits beyond the second decimal place round half away from zero.
    /// An empty string parses as zero, matching blank income/outcome cells.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::zero());
        }

        let (negative, digits) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(MoneyParseError::InvalidFormat(s.to_string()));
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| MoneyParseError::OutOfRange(s.to_string()))?
        };

        let frac_bytes = fraction.as_bytes();
        let digit = |idx: usize| frac_bytes.get(idx).map(|b| i64::from(b - b'0')).unwrap_or(0);
        let mut cents = digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            cents += 1;
        }

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(|| MoneyParseError::OutOfRange(s.to_string()))?;

        Ok(Self(if negative { -total } else { total }))
    }

    /// Plain two-decimal representation used in ledger files, e.g. "-12.05"
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

/// Deserialize a CSV cell from its text
///
/// Cells always go through [`Money::parse`], so `1.005` rounds to `1.01`
/// instead of passing through a float first.
pub fn deserialize_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    let cell = String::deserialize(deserializer)?;
    Money::parse(&cell).map_err(de::Error::custom)
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as a number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom(MoneyParseError::OutOfRange(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map_err(|_| E::custom(MoneyParseError::OutOfRange(v.to_string())))
            .and_then(|v| self.visit_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_f64(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse(v).map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::zero())
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    OutOfRange(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::OutOfRange(s) => write!(f, "Money amount out of range: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
        assert_eq!(Money::parse("-0.29").unwrap().cents(), -29);
        assert_eq!(Money::parse(".5").unwrap().cents(), 50);
        assert_eq!(Money::parse("").unwrap(), Money::zero());
    }

    #[test]
    fn test_parse_rounds_extra_precision() {
        assert_eq!(Money::parse("1.005").unwrap().cents(), 101);
        assert_eq!(Money::parse("1.004").unwrap().cents(), 100);
        assert_eq!(Money::parse("-1.005").unwrap().cents(), -101);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1,50").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("-").is_err());
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_cents(1050).to_decimal_string(), "10.50");
        assert_eq!(Money::from_cents(0).to_decimal_string(), "0.00");
        assert_eq!(Money::from_cents(-5).to_decimal_string(), "-0.05");
        assert_eq!(Money::from_cents(-1205).to_string(), "-12.05");
    }

    #[test]
    fn test_parts() {
        assert_eq!(Money::from_cents(3000).positive_part().cents(), 3000);
        assert_eq!(Money::from_cents(3000).negative_part().cents(), 0);
        assert_eq!(Money::from_cents(-3000).positive_part().cents(), 0);
        assert_eq!(Money::from_cents(-3000).negative_part().cents(), 3000);
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Money::from_f64(0.29).unwrap().cents(), 29);
        assert_eq!(Money::from_f64(150.0).unwrap().cents(), 15000);
        assert!(Money::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        let big = Money::from_cents(i64::MAX - 10);
        assert_eq!(
            big.checked_add(Money::from_cents(10)),
            Some(Money::from_cents(i64::MAX))
        );
        assert_eq!(big.checked_add(Money::from_cents(11)), None);
        assert_eq!(
            Money::from_cents(-big.cents()).checked_sub(Money::from_cents(100)),
            None
        );
        assert_eq!(
            Money::from_cents(-i64::MAX).checked_sub(Money::from_cents(1)),
            None
        );
        assert_eq!(
            Money::from_units(5).checked_sub(Money::from_units(7)),
            Some(Money::from_units(-2))
        );
    }

    #[test]
    fn test_json_numbers_and_strings() {
        let from_int: Money = serde_json::from_str("150").unwrap();
        assert_eq!(from_int.cents(), 15000);
        let from_float: Money = serde_json::from_str("120.55").unwrap();
        assert_eq!(from_float.cents(), 12055);
        let from_str: Money = serde_json::from_str("\"-3.10\"").unwrap();
        assert_eq!(from_str.cents(), -310);

        let json = serde_json::to_string(&Money::from_cents(1050)).unwrap();
        assert_eq!(json, "\"10.50\"");
    }
}
