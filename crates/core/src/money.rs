//! Prices in minor currency units.
//!
//! The backend stores prices as two-place decimals and serves them either as
//! JSON strings (`"149.99"`) or numbers (`149.99`). Both are parsed into whole
//! cents; anything negative, non-finite or finer than a cent is refused.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PortalError;

const CENTS_PER_UNIT: u64 = 100;

/// A non-negative amount of money, stored as cents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Parse a plain decimal such as `"310"`, `"99.5"` or `"149.99"`.
    pub fn parse(raw: &str) -> Result<Self, PortalError> {
        let invalid = |msg: &str| PortalError::validation("price", format!("{msg}: {raw:?}"));

        let text = raw.trim();
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("not a non-negative decimal"));
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("not a non-negative decimal"));
        }
        if fraction.len() > 2 {
            return Err(invalid("more than two decimal places"));
        }

        let units: u64 = whole.parse().map_err(|_| invalid("out of range"))?;
        let mut cents: u64 = 0;
        for (i, digit) in fraction.bytes().enumerate() {
            let weight = if i == 0 { 10 } else { 1 };
            cents += u64::from(digit - b'0') * weight;
        }

        units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|c| c.checked_add(cents))
            .map(Self)
            .ok_or_else(|| invalid("out of range"))
    }

    /// Convert a JSON number. Uses the shortest round-tripping decimal form of
    /// `value`, so `149.99` is exactly 14999 cents.
    pub fn from_f64(value: f64) -> Result<Self, PortalError> {
        if !value.is_finite() {
            return Err(PortalError::validation("price", "must be a finite number"));
        }
        Self::parse(&value.to_string())
    }

    fn as_f64(self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / CENTS_PER_UNIT, self.0 % CENTS_PER_UNIT)
    }
}

impl FromStr for Money {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Written back as a JSON number (`120.0`, `149.99`) to keep the persisted
// draft format unchanged.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Whole(u64),
            Number(f64),
            Text(String),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Whole(units) => units
                .checked_mul(CENTS_PER_UNIT)
                .map(Money)
                .ok_or_else(|| PortalError::validation("price", "out of range")),
            Raw::Number(n) => Money::from_f64(n),
            Raw::Text(s) => Money::parse(&s),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}
