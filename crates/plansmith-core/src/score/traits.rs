//! Core Score trait definition

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{Add, Neg, Sub};

use rust_decimal::Decimal;
use thiserror::Error;

use super::ScoreLevel;

/// Core trait for all score types.
///
/// Scores are lexicographically ordered tuples of levels, highest priority
/// first. Addition is component-wise, so it is commutative and associative.
/// Comparison is level by level with no tolerance, for integer and decimal
/// levels alike.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + Hash
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns true if every hard level is zero or better.
    ///
    /// Derived on demand, never stored. Soft and medium levels have no
    /// influence on feasibility.
    fn is_feasible(&self) -> bool;

    /// Returns the zero score (identity element for addition).
    fn zero() -> Self;

    /// Returns the number of score levels.
    fn levels_count() -> usize;

    /// Returns the levels as floating point numbers, highest priority first.
    ///
    /// Only meant for heuristics such as simulated annealing that need a
    /// magnitude. Never used for comparison or feasibility.
    fn to_level_numbers(&self) -> Vec<f64>;

    /// Multiplies every level by an integer match weight.
    fn multiply(&self, multiplier: i64) -> Self;

    /// Returns the absolute value of this score.
    fn abs(&self) -> Self;

    /// Returns the semantic label for the level at `index`, if it exists.
    fn level_label(index: usize) -> Option<ScoreLevel>;

    /// Returns true if this score is better than the other score.
    fn is_better_than(&self, other: &Self) -> bool {
        self > other
    }

    /// Returns true if this score is worse than the other score.
    fn is_worse_than(&self, other: &Self) -> bool {
        self < other
    }
}

/// Scores whose levels are decimals and may be scaled by decimal weights.
pub trait DecimalScore: Score {
    /// Multiplies every level by a decimal match weight, exactly.
    fn multiply_decimal(&self, multiplier: Decimal) -> Self;
}

/// Scores that can be parsed from their display form.
pub trait ParseableScore: Score {
    /// Parses a score such as `"0hard/-100soft"`.
    fn parse(s: &str) -> Result<Self, ScoreParseError>;

    /// Returns the string representation of this score.
    fn to_string_repr(&self) -> String;
}

/// Error when parsing a score from string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("score parse error: {message}")]
pub struct ScoreParseError {
    pub message: String,
}
