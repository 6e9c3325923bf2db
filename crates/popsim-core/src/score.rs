//! IntegerizeScore - three-level score for integer weight assignments

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Fixed-point scale applied to fractional penalties.
pub const PENALTY_SCALE: f64 = 1000.0;

/// Quality of an integer weight assignment for one zone.
///
/// Levels are compared lexicographically and higher is better:
/// 1. `hard`: negated absolute miss on the total-household control
/// 2. `medium`: negated importance-weighted miss on every other control
/// 3. `soft`: negated distance between integer and fractional weights
///
/// `medium` and `soft` are fixed-point, scaled by [`PENALTY_SCALE`].
///
/// # Examples
///
/// ```
/// use popsim_core::IntegerizeScore;
///
/// let off_by_one_household = IntegerizeScore::of(-1, 0, 0);
/// let poor_controls = IntegerizeScore::of(0, -50_000, -900);
///
/// // Matching the household total beats everything else
/// assert!(poor_controls > off_by_one_household);
/// assert!(poor_controls.is_feasible());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntegerizeScore {
    hard: i64,
    medium: i64,
    soft: i64,
}

impl IntegerizeScore {
    /// The zero (perfect) score.
    pub const ZERO: IntegerizeScore = IntegerizeScore {
        hard: 0,
        medium: 0,
        soft: 0,
    };

    #[inline]
    pub const fn of(hard: i64, medium: i64, soft: i64) -> Self {
        IntegerizeScore { hard, medium, soft }
    }

    /// Builds a score from non-negative penalties.
    ///
    /// `household_miss` is a whole number of households; the other two are
    /// scaled to fixed point and rounded.
    pub fn from_penalties(
        household_miss: f64,
        control_penalty: f64,
        rounding_distance: f64,
    ) -> Self {
        IntegerizeScore {
            hard: -(household_miss.abs().round() as i64),
            medium: -((control_penalty.abs() * PENALTY_SCALE).round() as i64),
            soft: -((rounding_distance.abs() * PENALTY_SCALE).round() as i64),
        }
    }

    #[inline]
    pub const fn hard(&self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn medium(&self) -> i64 {
        self.medium
    }

    #[inline]
    pub const fn soft(&self) -> i64 {
        self.soft
    }

    /// The household total is met exactly.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.hard >= 0
    }

    /// Household total and every control are met exactly.
    ///
    /// The soft level is ignored: rounding distance can never reach zero
    /// for fractional weights.
    #[inline]
    pub fn is_perfect(&self) -> bool {
        self.hard >= 0 && self.medium >= 0
    }
}

impl Ord for IntegerizeScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hard
            .cmp(&other.hard)
            .then(self.medium.cmp(&other.medium))
            .then(self.soft.cmp(&other.soft))
    }
}

impl PartialOrd for IntegerizeScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for IntegerizeScore {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        IntegerizeScore::of(
            self.hard + rhs.hard,
            self.medium + rhs.medium,
            self.soft + rhs.soft,
        )
    }
}

impl Sub for IntegerizeScore {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        IntegerizeScore::of(
            self.hard - rhs.hard,
            self.medium - rhs.medium,
            self.soft - rhs.soft,
        )
    }
}

impl Neg for IntegerizeScore {
    type Output = Self;

    fn neg(self) -> Self {
        IntegerizeScore::of(-self.hard, -self.medium, -self.soft)
    }
}

impl fmt::Debug for IntegerizeScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IntegerizeScore({}, {}, {})",
            self.hard, self.medium, self.soft
        )
    }
}

impl fmt::Display for IntegerizeScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}hard/{}medium/{}soft",
            self.hard, self.medium, self.soft
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation() {
        let score = IntegerizeScore::of(-2, -10, -100);
        assert_eq!(score.hard(), -2);
        assert_eq!(score.medium(), -10);
        assert_eq!(score.soft(), -100);
    }

    #[test]
    fn test_from_penalties_scales() {
        let score = IntegerizeScore::from_penalties(1.0, 2.5, 0.25);
        assert_eq!(score, IntegerizeScore::of(-1, -2500, -250));
    }

    #[test]
    fn test_comparison() {
        // Hard dominates
        let s1 = IntegerizeScore::of(-1, 0, 0);
        let s2 = IntegerizeScore::of(0, -1000, -1000);
        assert!(s2 > s1);

        // Medium dominates soft
        let s3 = IntegerizeScore::of(0, -10, 0);
        let s4 = IntegerizeScore::of(0, -5, -1000);
        assert!(s4 > s3);

        // Soft when others equal
        assert!(IntegerizeScore::of(0, 0, -50) > IntegerizeScore::of(0, 0, -100));
    }

    #[test]
    fn test_feasible_and_perfect() {
        assert!(IntegerizeScore::of(0, -1, -1).is_feasible());
        assert!(!IntegerizeScore::of(0, -1, -1).is_perfect());
        assert!(IntegerizeScore::of(0, 0, -400).is_perfect());
        assert!(!IntegerizeScore::of(-1, 0, 0).is_feasible());
    }

    #[test]
    fn test_arithmetic() {
        let s1 = IntegerizeScore::of(-1, -10, -100);
        let s2 = IntegerizeScore::of(-1, -5, -50);

        assert_eq!(s1 + s2, IntegerizeScore::of(-2, -15, -150));
        assert_eq!(s1 - s2, IntegerizeScore::of(0, -5, -50));
        assert_eq!(-s1, IntegerizeScore::of(1, 10, 100));
    }

    #[test]
    fn test_display() {
        let score = IntegerizeScore::of(-1, -10, -100);
        assert_eq!(format!("{}", score), "-1hard/-10medium/-100soft");
    }
}
