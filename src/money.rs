//! Fixed-point monetary amount with 2 decimal places.
//!
//! Uses `rust_decimal` internally with scale enforcement so that every line
//! of a ledger group is rendered exactly as it is summed. Binary floating
//! point never enters the pipeline, so amounts are always finite.
//! Addition is checked: an out-of-range sum yields `None`, never a panic.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

/// A decimal amount that maintains exactly 2 decimal places.
///
/// Values are rounded half away from zero when normalized, matching the
/// `%.2f` rendering accounting packages expect.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use float_iif::Money;
///
/// let amount = Money::from_str("1,000.5").unwrap();
/// assert_eq!(amount.to_string(), "1000.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Money(Decimal);

impl Money {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// Creates a new `Money` from a `Decimal`, rounding to 2 decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut normalized =
            value.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        normalized.rescale(Self::SCALE);
        if normalized.is_zero() {
            // -0.00 must never reach the output
            normalized.set_sign_positive(true);
        }
        Money(normalized)
    }

    /// Parses a raw export cell, never failing.
    ///
    /// Thousands separators and surrounding whitespace are stripped and
    /// `(12.50)` is read as a negative amount. Anything that still does not
    /// parse as a decimal number yields zero.
    pub fn parse_lenient(raw: &str) -> Self {
        let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
        let cleaned = cleaned.trim();

        if let Some(inner) = cleaned
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return -Self::parse_lenient(inner);
        }

        Decimal::from_str(cleaned)
            .or_else(|_| Decimal::from_scientific(cleaned))
            .map(Money::new)
            .unwrap_or(Money::ZERO)
    }

    /// Returns the underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if this value is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checked addition. Returns `None` if the result is out of range.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money::new)
    }

    /// Checked subtraction. Returns `None` if the result is out of range.
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money::new)
    }

    /// Sums `amounts` in order, returning `None` on overflow.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, m| acc.checked_add(m))
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
        let decimal = Decimal::from_str(&cleaned)?;
        Ok(Money::new(decimal))
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money::new(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// Negating a decimal only flips its sign bit, so it cannot overflow.
impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money::new(-self.0)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}
