//! Fixed-point money representation
//!
//! All monetary values in the engine are fixed-point decimals at scale 2
//! (cents), stored as `i64` minor units. Floating point is never used for
//! money anywhere in this crate.
//!
//! CRITICAL: All money values are i64 minor units (scale 2)

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative fixed-point monetary amount at scale 2 (cents).
///
/// # Example
/// ```
/// use load_adjudication_engine::money::Money;
///
/// let m = Money::from_minor_units(10050);
/// assert_eq!(m.to_string(), "100.50");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Zero dollars.
    pub const ZERO: Money = Money(0);

    /// Construct from a minor-unit (cent) count.
    ///
    /// # Panics
    /// Panics if `minor_units` is negative; money is non-negative by
    /// construction everywhere in this engine.
    pub fn from_minor_units(minor_units: i64) -> Self {
        assert!(minor_units >= 0, "money must be non-negative");
        Money(minor_units)
    }

    /// Minor-unit (cent) count.
    pub fn minor_units(self) -> i64 {
        self.0
    }

    /// Checked addition; `None` on overflow.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Multiply by a rational multiplier expressed as `(numerator, denominator)`,
    /// rounding the result to scale 2 with banker's rounding (round-half-to-even).
    ///
    /// Used by feature derivation (C4) to apply risk multipliers while keeping
    /// the result audit-stable: the same inputs always round the same way,
    /// regardless of platform.
    pub fn scaled_round_half_even(self, numerator: i64, denominator: i64) -> Money {
        assert!(denominator > 0, "denominator must be positive");
        // Work in a common fixed-point space: amount (minor units) * numerator,
        // then divide by denominator with round-half-to-even.
        let product = self.0 as i128 * numerator as i128;
        let denom = denominator as i128;
        let quotient = product / denom;
        let remainder = product % denom;
        let rounded = if remainder.abs() * 2 > denom.abs() {
            if (product < 0) != (denom < 0) {
                quotient - 1
            } else {
                quotient + 1
            }
        } else if remainder.abs() * 2 == denom.abs() {
            // Exactly halfway: round to even.
            if quotient % 2 == 0 {
                quotient
            } else if (product < 0) != (denom < 0) {
                quotient - 1
            } else {
                quotient + 1
            }
        } else {
            quotient
        };
        Money(rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let cents = (self.0 % 100).abs();
        write!(f, "{}.{:02}", whole, cents)
    }
}

impl std::ops::Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        self.checked_add(rhs)
            .expect("money addition overflowed i64")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_two_decimal_places() {
        assert_eq!(Money::from_minor_units(100050).to_string(), "1000.50");
        assert_eq!(Money::from_minor_units(1).to_string(), "0.01");
    }

    #[test]
    #[should_panic(expected = "money must be non-negative")]
    fn rejects_negative_construction() {
        Money::from_minor_units(-1);
    }

    #[test]
    fn identity_multiplier_is_exact() {
        let m = Money::from_minor_units(123456);
        assert_eq!(m.scaled_round_half_even(1, 1), m);
    }

    #[test]
    fn half_even_rounds_to_nearest_even() {
        // 2.5 cents rounds to 2 (even); 1.5 cents rounds to 2 (even).
        let a = Money::from_minor_units(5).scaled_round_half_even(1, 2); // 2.5 -> 2
        let b = Money::from_minor_units(3).scaled_round_half_even(1, 2); // 1.5 -> 2
        assert_eq!(a.minor_units(), 2);
        assert_eq!(b.minor_units(), 2);
    }

    #[test]
    fn addition_sums_minor_units() {
        let a = Money::from_minor_units(499999);
        let b = Money::from_minor_units(2);
        assert_eq!((a + b).minor_units(), 500001);
    }
}
