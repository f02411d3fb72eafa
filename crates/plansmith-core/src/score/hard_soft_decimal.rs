//! HardSoftDecimalScore - two-level decimal score

use std::fmt;

use rust_decimal::Decimal;

use super::traits::{DecimalScore, Score};
use super::ScoreLevel;

/// A score with hard and soft decimal levels.
///
/// Levels are `rust_decimal::Decimal` values, so sums and comparisons are
/// exact: `0.1 + 0.2 == 0.3` holds and no rounding reaches feasibility.
///
/// # Examples
///
/// ```
/// use plansmith_core::{Decimal, HardSoftDecimalScore, Score};
///
/// let a = HardSoftDecimalScore::of_soft(Decimal::new(1, 1)); // 0.1
/// let b = HardSoftDecimalScore::of_soft(Decimal::new(2, 1)); // 0.2
///
/// assert_eq!(a + b, HardSoftDecimalScore::of_soft(Decimal::new(3, 1)));
/// assert!((a + b).is_feasible());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardSoftDecimalScore {
    hard: Decimal,
    soft: Decimal,
}

impl HardSoftDecimalScore {
    /// The zero score.
    pub const ZERO: HardSoftDecimalScore = HardSoftDecimalScore::of(Decimal::ZERO, Decimal::ZERO);

    /// One hard constraint penalty.
    pub const ONE_HARD: HardSoftDecimalScore =
        HardSoftDecimalScore::of(Decimal::ONE, Decimal::ZERO);

    /// One soft constraint penalty.
    pub const ONE_SOFT: HardSoftDecimalScore =
        HardSoftDecimalScore::of(Decimal::ZERO, Decimal::ONE);

    #[inline]
    pub const fn of(hard: Decimal, soft: Decimal) -> Self {
        HardSoftDecimalScore { hard, soft }
    }

    #[inline]
    pub const fn of_hard(hard: Decimal) -> Self {
        HardSoftDecimalScore::of(hard, Decimal::ZERO)
    }

    #[inline]
    pub const fn of_soft(soft: Decimal) -> Self {
        HardSoftDecimalScore::of(Decimal::ZERO, soft)
    }

    /// Creates a score from integer levels.
    pub fn of_ints(hard: i64, soft: i64) -> Self {
        HardSoftDecimalScore::of(Decimal::from(hard), Decimal::from(soft))
    }

    #[inline]
    pub const fn hard(&self) -> Decimal {
        self.hard
    }

    #[inline]
    pub const fn soft(&self) -> Decimal {
        self.soft
    }
}

impl Score for HardSoftDecimalScore {
    #[inline]
    fn is_feasible(&self) -> bool {
        self.hard >= Decimal::ZERO
    }

    #[inline]
    fn zero() -> Self {
        HardSoftDecimalScore::ZERO
    }

    #[inline]
    fn levels_count() -> usize {
        2
    }

    impl_decimal_score_scale!(HardSoftDecimalScore { hard, soft } => of);

    fn level_label(index: usize) -> Option<ScoreLevel> {
        match index {
            0 => Some(ScoreLevel::Hard),
            1 => Some(ScoreLevel::Soft),
            _ => None,
        }
    }
}

impl DecimalScore for HardSoftDecimalScore {
    fn multiply_decimal(&self, multiplier: Decimal) -> Self {
        HardSoftDecimalScore::of(self.hard * multiplier, self.soft * multiplier)
    }
}

impl_score_ops!(HardSoftDecimalScore { hard, soft } => of);

impl fmt::Debug for HardSoftDecimalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardSoftDecimalScore({}, {})", self.hard, self.soft)
    }
}

impl_score_parse!(HardSoftDecimalScore { hard => "hard", soft => "soft" } as Decimal => of);
