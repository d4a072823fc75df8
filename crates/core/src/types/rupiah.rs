//! Indonesian rupiah amounts using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount of Indonesian rupiah.
///
/// Stored as a `Decimal` so sums of cart totals never drift. Displays the way
/// staff read prices in the `id-ID` locale: whole rupiah, `.` as the
/// thousands separator, `Rp` prefix (`Rp 1.250.000`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Rupiah(Decimal);

impl Rupiah {
    /// Zero rupiah.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format without the `Rp` prefix (`1.250.000`).
    #[must_use]
    pub fn grouped(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let digits = rounded.abs().trunc().to_string();

        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push('.');
            }
            out.push(c);
        }
        out
    }
}

impl fmt::Display for Rupiah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rp {}", self.grouped())
    }
}

impl From<Decimal> for Rupiah {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl core::ops::Add for Rupiah {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Rupiah {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl core::iter::Sum for Rupiah {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Rupiah::new(Decimal::new(1_250_000, 0)).to_string(), "Rp 1.250.000");
        assert_eq!(Rupiah::new(Decimal::new(999, 0)).to_string(), "Rp 999");
        assert_eq!(Rupiah::new(Decimal::new(1000, 0)).to_string(), "Rp 1.000");
    }

    #[test]
    fn test_display_zero() {
        assert_eq!(Rupiah::ZERO.to_string(), "Rp 0");
    }

    #[test]
    fn test_display_rounds_to_whole_rupiah() {
        // 15000.50 rounds half away from zero
        assert_eq!(Rupiah::new(Decimal::new(1_500_050, 2)).grouped(), "15.001");
        assert_eq!(Rupiah::new(Decimal::new(1_500_049, 2)).grouped(), "15.000");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Rupiah::new(Decimal::new(-25_000, 0)).grouped(), "-25.000");
    }

    #[test]
    fn test_sum() {
        let total: Rupiah = [10_000, 20_500, 0]
            .into_iter()
            .map(|n| Rupiah::new(Decimal::new(n, 0)))
            .sum();
        assert_eq!(total.grouped(), "30.500");
    }
}
