//! HardMediumSoftDecimalScore - three-level decimal score

use std::fmt;

use rust_decimal::Decimal;

use super::traits::{DecimalScore, Score};
use super::ScoreLevel;

/// A score with hard, medium, and soft decimal levels.
///
/// Used by fairness constraints whose match weight is an unfairness
/// measure rather than a count.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardMediumSoftDecimalScore {
    hard: Decimal,
    medium: Decimal,
    soft: Decimal,
}

impl HardMediumSoftDecimalScore {
    /// The zero score.
    pub const ZERO: HardMediumSoftDecimalScore =
        HardMediumSoftDecimalScore::of(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);

    /// One hard constraint penalty.
    pub const ONE_HARD: HardMediumSoftDecimalScore =
        HardMediumSoftDecimalScore::of(Decimal::ONE, Decimal::ZERO, Decimal::ZERO);

    /// One medium constraint penalty.
    pub const ONE_MEDIUM: HardMediumSoftDecimalScore =
        HardMediumSoftDecimalScore::of(Decimal::ZERO, Decimal::ONE, Decimal::ZERO);

    /// One soft constraint penalty.
    pub const ONE_SOFT: HardMediumSoftDecimalScore =
        HardMediumSoftDecimalScore::of(Decimal::ZERO, Decimal::ZERO, Decimal::ONE);

    #[inline]
    pub const fn of(hard: Decimal, medium: Decimal, soft: Decimal) -> Self {
        HardMediumSoftDecimalScore { hard, medium, soft }
    }

    #[inline]
    pub const fn of_hard(hard: Decimal) -> Self {
        HardMediumSoftDecimalScore::of(hard, Decimal::ZERO, Decimal::ZERO)
    }

    #[inline]
    pub const fn of_medium(medium: Decimal) -> Self {
        HardMediumSoftDecimalScore::of(Decimal::ZERO, medium, Decimal::ZERO)
    }

    #[inline]
    pub const fn of_soft(soft: Decimal) -> Self {
        HardMediumSoftDecimalScore::of(Decimal::ZERO, Decimal::ZERO, soft)
    }

    /// Creates a score from integer levels.
    pub fn of_ints(hard: i64, medium: i64, soft: i64) -> Self {
        HardMediumSoftDecimalScore::of(
            Decimal::from(hard),
            Decimal::from(medium),
            Decimal::from(soft),
        )
    }

    #[inline]
    pub const fn hard(&self) -> Decimal {
        self.hard
    }

    #[inline]
    pub const fn medium(&self) -> Decimal {
        self.medium
    }

    #[inline]
    pub const fn soft(&self) -> Decimal {
        self.soft
    }
}

impl Score for HardMediumSoftDecimalScore {
    #[inline]
    fn is_feasible(&self) -> bool {
        self.hard >= Decimal::ZERO
    }

    #[inline]
    fn zero() -> Self {
        HardMediumSoftDecimalScore::ZERO
    }

    #[inline]
    fn levels_count() -> usize {
        3
    }

    impl_decimal_score_scale!(HardMediumSoftDecimalScore { hard, medium, soft } => of);

    fn level_label(index: usize) -> Option<ScoreLevel> {
        match index {
            0 => Some(ScoreLevel::Hard),
            1 => Some(ScoreLevel::Medium),
            2 => Some(ScoreLevel::Soft),
            _ => None,
        }
    }
}

impl DecimalScore for HardMediumSoftDecimalScore {
    fn multiply_decimal(&self, multiplier: Decimal) -> Self {
        HardMediumSoftDecimalScore::of(
            self.hard * multiplier,
            self.medium * multiplier,
            self.soft * multiplier,
        )
    }
}

impl_score_ops!(HardMediumSoftDecimalScore { hard, medium, soft } => of);

impl fmt::Debug for HardMediumSoftDecimalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HardMediumSoftDecimalScore({}, {}, {})",
            self.hard, self.medium, self.soft
        )
    }
}

impl_score_parse!(HardMediumSoftDecimalScore { hard => "hard", medium => "medium", soft => "soft" } as Decimal => of);
