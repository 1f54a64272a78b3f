//! # Exact Rational Arithmetic
//!
//! Every duration, meter and tempo beat is a [`Fraction`]. Fractions are always
//! stored in lowest terms with a positive denominator, so derived equality and
//! hashing compare by value: `1/2 == 2/4`.
//!
//! ## Degenerate gcd/lcm cases
//! These are fixed conventions and must not be "fixed":
//! - `gcd(a, 0) == a`, `gcd(0, 0) == 0`
//! - `lcm(a, 0) == 0`, `lcm(0, 0) == 0`
//!
//! ## Overflow
//! Arithmetic is checked: [`lcm`], [`Fraction::checked_add`],
//! [`Fraction::checked_mul`] and [`Fraction::checked_div`] return `None`
//! when a result does not fit in `i64`.
//!
//! ## Duration suffixes
//! The text that follows a pitch in a note token is read by
//! [`Fraction::from_duration_suffix`]:
//!
//! | suffix | value |
//! |--------|-------|
//! | (none) | 1/1   |
//! | `N`    | N/1   |
//! | `/N`   | 1/N   |
//! | `N/M`  | N/M   |
//! | `/`    | 1/2   |
//! | `N/`   | N/2   |

use crate::error::AbcError;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Greatest common divisor of the magnitudes of `a` and `b`.
///
/// Saturates at `i64::MAX` for `gcd(i64::MIN, 0)` and `gcd(i64::MIN, i64::MIN)`.
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    i64::try_from(a).unwrap_or(i64::MAX)
}

/// Least common multiple; zero whenever either argument is zero, `None` on overflow.
///
/// ```
/// # use abcplay::lcm;
/// assert_eq!(lcm(4, 6), Some(12));
/// assert_eq!(lcm(4, 0), Some(0));
/// assert_eq!(lcm(i64::MAX, 2), None);
/// ```
pub fn lcm(a: i64, b: i64) -> Option<i64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)?.checked_abs()
}

/// An exact rational number in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: i64,
    denominator: i64,
}

impl Fraction {
    pub const ZERO: Fraction = Fraction::raw(0, 1);
    pub const ONE: Fraction = Fraction::raw(1, 1);

    /// Caller guarantees lowest terms and `denominator > 0`.
    pub(crate) const fn raw(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Build a fraction, reducing it to lowest terms.
    ///
    /// ```
    /// # use abcplay::Fraction;
    /// let half = Fraction::new(2, 4).unwrap();
    /// assert_eq!(half, Fraction::new(1, 2).unwrap());
    /// assert!(Fraction::new(1, 0).is_err());
    /// ```
    pub fn new(numerator: i64, denominator: i64) -> Result<Self, AbcError> {
        if denominator == 0 {
            return Err(AbcError::InvalidFraction(format!(
                "{}/{} has a zero denominator",
                numerator, denominator
            )));
        }
        Self::reduced(numerator, denominator).ok_or_else(|| {
            AbcError::InvalidFraction(format!("{}/{} is out of range", numerator, denominator))
        })
    }

    pub fn from_integer(value: i64) -> Self {
        Self::raw(value, 1)
    }

    /// `None` when the sign cannot be moved to the numerator.
    fn reduced(numerator: i64, denominator: i64) -> Option<Self> {
        let (numerator, denominator) = if denominator < 0 {
            (numerator.checked_neg()?, denominator.checked_neg()?)
        } else {
            (numerator, denominator)
        };
        let divisor = gcd(numerator, denominator);
        Some(Self::raw(numerator / divisor, denominator / divisor))
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    pub fn is_positive(&self) -> bool {
        self.numerator > 0
    }

    /// `self + rhs`, or `None` on overflow.
    ///
    /// ```
    /// # use abcplay::Fraction;
    /// let half = Fraction::new(1, 2).unwrap();
    /// let third = Fraction::new(1, 3).unwrap();
    /// assert_eq!(half.checked_add(third), Some(Fraction::new(5, 6).unwrap()));
    /// ```
    pub fn checked_add(self, rhs: Fraction) -> Option<Fraction> {
        let denominator = lcm(self.denominator, rhs.denominator)?;
        let lhs = self.numerator.checked_mul(denominator / self.denominator)?;
        let rhs = rhs.numerator.checked_mul(denominator / rhs.denominator)?;
        Self::reduced(lhs.checked_add(rhs)?, denominator)
    }

    /// `self * rhs`, or `None` on overflow. Cross-cancels before multiplying.
    pub fn checked_mul(self, rhs: Fraction) -> Option<Fraction> {
        let left = gcd(self.numerator, rhs.denominator);
        let right = gcd(rhs.numerator, self.denominator);
        Self::reduced(
            (self.numerator / left).checked_mul(rhs.numerator / right)?,
            (self.denominator / right).checked_mul(rhs.denominator / left)?,
        )
    }

    /// `self / rhs`, or `None` when `rhs` is zero or the result overflows.
    pub fn checked_div(self, rhs: Fraction) -> Option<Fraction> {
        if rhs.numerator == 0 {
            return None;
        }
        self.checked_mul(Self::reduced(rhs.denominator, rhs.numerator)?)
    }

    /// Sum of all fractions, or `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Fraction>>(fractions: I) -> Option<Fraction> {
        fractions
            .into_iter()
            .try_fold(Fraction::ZERO, |acc, f| acc.checked_add(f))
    }

    /// Parse the duration suffix of a note token (the text after the pitch).
    ///
    /// ```
    /// # use abcplay::Fraction;
    /// assert_eq!(Fraction::from_duration_suffix("").unwrap(), Fraction::ONE);
    /// assert_eq!(Fraction::from_duration_suffix("/").unwrap(), Fraction::new(1, 2).unwrap());
    /// assert_eq!(Fraction::from_duration_suffix("3/4").unwrap(), Fraction::new(3, 4).unwrap());
    /// ```
    pub fn from_duration_suffix(suffix: &str) -> Result<Self, AbcError> {
        match suffix.split_once('/') {
            None if suffix.is_empty() => Ok(Self::ONE),
            None => Ok(Self::from_integer(parse_component(suffix)?)),
            Some((numerator, denominator)) => {
                let numerator = if numerator.is_empty() {
                    1
                } else {
                    parse_component(numerator)?
                };
                let denominator = if denominator.is_empty() {
                    2
                } else {
                    parse_component(denominator)?
                };
                Self::new(numerator, denominator)
            }
        }
    }
}

fn parse_component(text: &str) -> Result<i64, AbcError> {
    text.parse::<i64>()
        .map_err(|_| AbcError::InvalidFraction(format!("'{}' is not an integer", text)))
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for Fraction {
    type Err = AbcError;

    /// Reads `n/d` or a bare integer `n`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('/') {
            Some((numerator, denominator)) => Self::new(
                parse_component(numerator.trim())?,
                parse_component(denominator.trim())?,
            ),
            None => Ok(Self::from_integer(parse_component(s)?)),
        }
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.numerator as i128 * other.denominator as i128;
        let rhs = other.numerator as i128 * self.denominator as i128;
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl Serialize for Fraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frac(n: i64, d: i64) -> Fraction {
        Fraction::new(n, d).unwrap()
    }

    #[test]
    fn test_gcd_known_values() {
        assert_eq!(gcd(24, 42), 6);
        assert_eq!(gcd(42, 24), 6);
        assert_eq!(gcd(24, i32::MAX as i64), 1);
        assert_eq!(gcd(1, 0), 1);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(0, 0), 0);
    }

    #[test]
    fn test_lcm_known_values() {
        assert_eq!(lcm(24, 42), Some(168));
        assert_eq!(lcm(42, 24), Some(168));
        assert_eq!(lcm(1, 0), Some(0));
        assert_eq!(lcm(0, 0), Some(0));
    }

    #[test]
    fn test_lcm_overflow_is_none() {
        assert_eq!(lcm(i64::MAX, 2), None);
        assert_eq!(lcm(4_000_000_007, 4_000_000_009), None);
        assert_eq!(lcm(i64::MIN, 1), None);
    }

    #[test]
    fn test_gcd_extreme_magnitudes() {
        assert_eq!(gcd(i64::MIN, 2), 2);
        assert_eq!(gcd(i64::MIN, 0), i64::MAX);
    }

    #[test]
    fn test_reduced_on_construction() {
        let f = frac(6, 8);
        assert_eq!(f.numerator(), 3);
        assert_eq!(f.denominator(), 4);

        let negative = frac(1, -2);
        assert_eq!(negative.numerator(), -1);
        assert_eq!(negative.denominator(), 2);

        assert_eq!(frac(0, 5), Fraction::ZERO);
    }

    #[test]
    fn test_equality_and_ordering_by_value() {
        assert_eq!(frac(1, 2), frac(2, 4));
        assert!(frac(1, 2) > frac(1, 3));
        assert!(frac(1, 3) < frac(1, 2));
        assert_eq!(frac(1, 2).cmp(&frac(2, 4)), Ordering::Equal);
    }

    #[test]
    fn test_zero_denominator_rejected() {
        assert!(matches!(Fraction::new(3, 0), Err(AbcError::InvalidFraction(_))));
        assert!("3/0".parse::<Fraction>().is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("3/4".parse::<Fraction>().unwrap(), frac(3, 4));
        assert_eq!(" 6/8 ".parse::<Fraction>().unwrap(), frac(3, 4));
        assert_eq!("2".parse::<Fraction>().unwrap(), frac(2, 1));
        assert!("a/4".parse::<Fraction>().is_err());
        assert!("".parse::<Fraction>().is_err());
    }

    #[test]
    fn test_duration_suffixes() {
        assert_eq!(Fraction::from_duration_suffix("").unwrap(), frac(1, 1));
        assert_eq!(Fraction::from_duration_suffix("2").unwrap(), frac(2, 1));
        assert_eq!(Fraction::from_duration_suffix("/2").unwrap(), frac(1, 2));
        assert_eq!(Fraction::from_duration_suffix("3/4").unwrap(), frac(3, 4));
        assert_eq!(Fraction::from_duration_suffix("/").unwrap(), frac(1, 2));
        assert_eq!(Fraction::from_duration_suffix("3/").unwrap(), frac(3, 2));
        assert!(Fraction::from_duration_suffix("1/0").is_err());
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(frac(1, 2).checked_add(frac(1, 3)), Some(frac(5, 6)));
        assert_eq!(frac(2, 3).checked_mul(frac(3, 4)), Some(frac(1, 2)));
        assert_eq!(frac(1, 8).checked_div(frac(1, 4)), Some(frac(1, 2)));
        assert_eq!(frac(1, 8).checked_div(frac(-1, 4)), Some(frac(-1, 2)));
        assert_eq!(frac(1, 8).checked_div(Fraction::ZERO), None);
        let total = Fraction::checked_sum([frac(1, 4), frac(1, 4), frac(1, 2)]);
        assert_eq!(total, Some(Fraction::ONE));
        assert_eq!(Fraction::checked_sum(Vec::new()), Some(Fraction::ZERO));
    }

    #[test]
    fn test_arithmetic_overflow_is_none() {
        let a = frac(1, 4_000_000_007);
        let b = frac(1, 4_000_000_009);
        assert_eq!(a.checked_add(b), None);
        assert_eq!(a.checked_mul(b), None);
        assert_eq!(Fraction::checked_sum([a, b, Fraction::ONE]), None);
        assert_eq!(Fraction::from_integer(i64::MAX).checked_add(Fraction::ONE), None);

        // Cross-cancellation keeps representable products in range
        let big = Fraction::from_integer(i64::MAX);
        assert_eq!(big.checked_mul(frac(1, i64::MAX)), Some(Fraction::ONE));
    }

    #[test]
    fn test_unrepresentable_sign_rejected() {
        assert!(matches!(Fraction::new(i64::MIN, -1), Err(AbcError::InvalidFraction(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(frac(3, 4).to_string(), "3/4");
        assert_eq!(frac(4, 2).to_string(), "2");
        assert_eq!(frac(-1, 2).to_string(), "-1/2");
    }

    proptest! {
        #[test]
        fn prop_gcd_is_symmetric(a in 0i64..1_000_000, b in 0i64..1_000_000) {
            prop_assert_eq!(gcd(a, b), gcd(b, a));
        }

        #[test]
        fn prop_gcd_with_zero_is_identity(a in 0i64..1_000_000) {
            prop_assert_eq!(gcd(a, 0), a);
            prop_assert_eq!(lcm(a, 0), Some(0));
        }

        #[test]
        fn prop_lcm_is_multiple_of_both(a in 1i64..10_000, b in 1i64..10_000) {
            let m = lcm(a, b).unwrap();
            prop_assert_eq!(m % a, 0);
            prop_assert_eq!(m % b, 0);
        }

        #[test]
        fn prop_scaled_fractions_are_equal(n in -1000i64..1000, d in 1i64..1000, k in 1i64..50) {
            prop_assert_eq!(frac(n, d), frac(n * k, d * k));
        }

        #[test]
        fn prop_ordering_matches_real_value(a in -1000i64..1000, b in 1i64..100, c in -1000i64..1000, d in 1i64..100) {
            let (x, y) = (frac(a, b), frac(c, d));
            prop_assert_eq!(x.cmp(&y), (a * d).cmp(&(c * b)));
            prop_assert!(x < x.checked_add(frac(1, d)).unwrap());
        }
    }
}
