//! Fixed-point decimal type with 2 decimal places precision.
//!
//! Uses `rust_decimal` internally with scale enforcement to ensure
//! consistent monetary calculations without floating-point errors.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A decimal type that maintains exactly 2 decimal places of precision.
///
/// This type wraps `rust_decimal::Decimal` and ensures consistent scale
/// for all arithmetic operations, suitable for account balances, transfer
/// amounts and tariffs.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use backoffice::Decimal2;
///
/// let amount = Decimal2::from_str("10.5").unwrap();
/// assert_eq!(amount.to_string(), "10.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Decimal2(Decimal);

impl Decimal2 {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Decimal2(Decimal::ZERO);

    /// Creates a new `Decimal2` from a `Decimal`, normalizing to 2 decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut normalized = value;
        normalized.rescale(Self::SCALE);
        Decimal2(normalized)
    }

    /// Creates a `Decimal2` from an integer number of cents.
    ///
    /// `Decimal2::from_cents(500)` is `5.00`.
    pub fn from_cents(cents: i64) -> Self {
        Decimal2(Decimal::new(cents, Self::SCALE))
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if this value is strictly below zero.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the smaller of `self` and `other`.
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

impl FromStr for Decimal2 {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)?;
        Ok(Decimal2::new(decimal))
    }
}

impl fmt::Display for Decimal2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Decimal2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Decimal2::new(self.0 + rhs.0)
    }
}

impl AddAssign for Decimal2 {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Sub for Decimal2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Decimal2::new(self.0 - rhs.0)
    }
}

impl SubAssign for Decimal2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
        self.0.rescale(Self::SCALE);
    }
}

impl Mul for Decimal2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Decimal2::new(self.0 * rhs.0)
    }
}

impl Neg for Decimal2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Decimal2::new(-self.0)
    }
}

impl Serialize for Decimal2 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:.2}", self.0))
    }
}

impl<'de> Deserialize<'de> for Decimal2 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Decimal2::from_str(&s).map_err(serde::de::Error::custom)
    }
}
