//! Monetary amounts in minor units.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Signed monetary amount in the currency's smallest unit (centavos).
///
/// Two decimal places of precision for the currencies in scope, so 1000.00
/// is `Amount::from_minor(100_000)`. No rounding ever happens past the minor
/// unit; arithmetic that could overflow goes through `i128` accumulators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub fn minor(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The inverse amount (used when reversing a movement).
    pub fn inverse(&self) -> Self {
        Self(-self.0)
    }

    /// Checked subtraction, surfacing overflow as a validation error.
    pub fn checked_sub(&self, other: Amount) -> Result<Amount, DomainError> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or_else(|| DomainError::validation("amount overflow"))
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Amount {
    fn from(minor: i64) -> Self {
        Self(minor)
    }
}
