//! Fixed-point fantasy points

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Fantasy points, always held at exactly two decimal places.
///
/// Every constructor rounds half up on the cents value and pins the scale
/// to 2, so equal scores are equal in representation as well as value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FantasyPoints(Decimal);

impl FantasyPoints {
    pub fn zero() -> Self {
        Self::from_cents(0)
    }

    /// Round an arbitrary decimal to cents
    pub fn from_decimal(value: Decimal) -> Self {
        Self(round_cents(value))
    }

    /// Create from an integer number of cents
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Create from whole points
    pub fn from_whole(points: i64) -> Self {
        Self::from_cents(points * 100)
    }

    pub fn to_decimal(self) -> Decimal {
        self.0
    }

    /// Value in cents
    pub fn to_cents(self) -> i64 {
        // Scale is pinned to 2, so the mantissa is the cent count.
        self.0.mantissa() as i64
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

/// Round half up at two decimal places.
fn round_cents(value: Decimal) -> Decimal {
    let strategy = if value.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    let mut rounded = value.round_dp_with_strategy(2, strategy);
    rounded.rescale(2);
    // -0.00 and 0.00 must compare and hash identically
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

impl<'de> Deserialize<'de> for FantasyPoints {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self::from_decimal)
    }
}

impl Default for FantasyPoints {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for FantasyPoints {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::from_decimal(self.0 + other.0)
    }
}

impl AddAssign for FantasyPoints {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for FantasyPoints {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::from_decimal(self.0 - other.0)
    }
}

impl Neg for FantasyPoints {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_decimal(-self.0)
    }
}

impl Sum for FantasyPoints {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, p| acc + p)
    }
}

impl<'a> Sum<&'a FantasyPoints> for FantasyPoints {
    fn sum<I: Iterator<Item = &'a FantasyPoints>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl std::fmt::Display for FantasyPoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_creation() {
        let points = FantasyPoints::from_cents(2280);
        assert_eq!(points.to_cents(), 2280);
        assert_eq!(points.to_string(), "22.80");
        assert_eq!(FantasyPoints::from_whole(22), FantasyPoints::from_cents(2200));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(FantasyPoints::from_decimal(Decimal::new(12345, 3)).to_cents(), 1235);
        assert_eq!(FantasyPoints::from_decimal(Decimal::new(12344, 3)).to_cents(), 1234);
        // half up on a negative value moves toward +inf
        assert_eq!(FantasyPoints::from_decimal(Decimal::new(-12345, 3)).to_cents(), -1234);
        assert_eq!(FantasyPoints::from_decimal(Decimal::new(-12346, 3)).to_cents(), -1235);
    }

    #[test]
    fn test_scale_is_pinned() {
        let a = FantasyPoints::from_decimal(Decimal::new(22, 0));
        let b = FantasyPoints::from_cents(2200);
        assert_eq!(a, b);
        assert_eq!(a.to_decimal().scale(), 2);
        assert_eq!(a.to_string(), "22.00");
    }

    #[test]
    fn test_negative_zero_normalised() {
        let z = FantasyPoints::from_decimal(Decimal::new(-4, 3));
        assert_eq!(z, FantasyPoints::zero());
        assert!(!z.to_decimal().is_sign_negative());
    }

    #[test]
    fn test_deserialize_rescales() {
        let points: FantasyPoints = serde_json::from_str("\"22.8\"").unwrap();
        assert_eq!(points.to_decimal().scale(), 2);
        assert_eq!(serde_json::to_string(&points).unwrap(), "\"22.80\"");
    }

    #[test]
    fn test_deserialize_rounds_stored_values() {
        let points: Vec<FantasyPoints> =
            serde_json::from_str(r#"["57.30", "22.805", "-0.004"]"#).unwrap();
        assert_eq!(
            points,
            vec![
                FantasyPoints::from_cents(5730),
                FantasyPoints::from_cents(2281),
                FantasyPoints::zero()
            ]
        );
    }

    #[test]
    fn test_arithmetic() {
        let a = FantasyPoints::from_cents(1050);
        let b = FantasyPoints::from_cents(-125);
        assert_eq!(a + b, FantasyPoints::from_cents(925));
        assert_eq!(a - b, FantasyPoints::from_cents(1175));
        assert_eq!(-a, FantasyPoints::from_cents(-1050));
        let total: FantasyPoints = [a, b, a].iter().sum();
        assert_eq!(total, FantasyPoints::from_cents(1975));
    }
}
