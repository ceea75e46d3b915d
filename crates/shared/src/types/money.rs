//! Integer-cents money type.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts in the system are whole numbers of cents, so money is a
//! plain `i64` wrapper with checked arithmetic.

use serde::{Deserialize, Serialize};

/// A monetary amount in whole cents.
///
/// Serializes transparently as an integer, matching the wire contract
/// (`amountInCents`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(pub i64);

impl Cents {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Creates a new amount from a raw cent count.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw cent count.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Checked multiplication by a count (e.g., number of installments).
    #[must_use]
    pub const fn checked_mul(self, count: i64) -> Option<Self> {
        match self.0.checked_mul(count) {
            Some(product) => Some(Self(product)),
            None => None,
        }
    }

    /// Saturating addition, for aggregation over untrusted record sets.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating multiplication by a count.
    #[must_use]
    pub const fn saturating_mul(self, count: i64) -> Self {
        Self(self.0.saturating_mul(count))
    }
}

impl std::fmt::Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::iter::Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Cents::saturating_add)
    }
}

impl From<i64> for Cents {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cents_new() {
        let amount = Cents::new(50_000);
        assert_eq!(amount.into_inner(), 50_000);
    }

    #[test]
    fn test_cents_zero() {
        assert!(Cents::ZERO.is_zero());
        assert!(!Cents::new(1).is_zero());
    }

    #[test]
    fn test_cents_is_negative() {
        assert!(Cents::new(-10).is_negative());
        assert!(!Cents::new(10).is_negative());
        assert!(!Cents::ZERO.is_negative());
    }

    #[test]
    fn test_checked_mul() {
        assert_eq!(Cents::new(50_000).checked_mul(10), Some(Cents::new(500_000)));
        assert_eq!(Cents::new(i64::MAX).checked_mul(2), None);
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(
            Cents::new(100).checked_add(Cents::new(23)),
            Some(Cents::new(123))
        );
        assert_eq!(Cents::new(i64::MAX).checked_add(Cents::new(1)), None);
    }

    #[test]
    fn test_sum() {
        let total: Cents = [Cents::new(100), Cents::new(200), Cents::new(300)]
            .into_iter()
            .sum();
        assert_eq!(total, Cents::new(600));
    }

    #[test]
    fn test_serde_transparent() {
        let amount = Cents::new(50_000);
        assert_eq!(serde_json::to_string(&amount).unwrap(), "50000");
        let parsed: Cents = serde_json::from_str("50000").unwrap();
        assert_eq!(parsed, amount);
    }
}
