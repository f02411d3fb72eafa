//! Foragers for construction heuristic move selection.
//!
//! Foragers return the index of the chosen candidate within the placement.
//! Termination is checked before every candidate; an interrupted forager
//! returns the best candidate seen so far.

use std::fmt::Debug;

use plansmith_core::Score;

use super::{evaluate, Placement};
use crate::error::SolverError;
use crate::scope::PhaseScope;

/// Picks one candidate of a placement.
pub trait ConstructionForager<S: Score>: Send + Debug {
    /// Evaluates candidates and returns the index of the one to keep.
    ///
    /// Returns None if no candidate can be applied.
    fn pick_move_index(
        &self,
        placement: &Placement,
        phase_scope: &mut PhaseScope<'_, S>,
    ) -> Result<Option<usize>, SolverError>;
}

/// First Fit forager - keeps the first candidate that does not make the
/// score worse than it was before the placement.
///
/// When every candidate worsens the score, the least bad one is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitForager;

impl FirstFitForager {
    pub fn new() -> Self {
        Self
    }
}

impl<S: Score> ConstructionForager<S> for FirstFitForager {
    fn pick_move_index(
        &self,
        placement: &Placement,
        phase_scope: &mut PhaseScope<'_, S>,
    ) -> Result<Option<usize>, SolverError> {
        let before = phase_scope.calculate_score();
        let mut fallback: Option<(usize, S)> = None;
        for idx in 0..placement.len() {
            if phase_scope.should_terminate() {
                break;
            }
            let Some(m) = placement.move_at(phase_scope.score_director().working_solution(), idx) else {
                continue;
            };
            let Some(score) = evaluate(&m, phase_scope.score_director_mut())? else {
                continue;
            };
            phase_scope.record_move(false);
            if score >= before {
                return Ok(Some(idx));
            }
            if fallback.as_ref().map_or(true, |(_, best)| score > *best) {
                fallback = Some((idx, score));
            }
        }
        Ok(fallback.map(|(idx, _)| idx))
    }
}

/// Best Fit forager - evaluates every candidate and keeps the best.
///
/// On a huge domain this only finishes under a termination.
///
/// Ties go to the earlier candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestFitForager;

impl BestFitForager {
    pub fn new() -> Self {
        Self
    }
}

impl<S: Score> ConstructionForager<S> for BestFitForager {
    fn pick_move_index(
        &self,
        placement: &Placement,
        phase_scope: &mut PhaseScope<'_, S>,
    ) -> Result<Option<usize>, SolverError> {
        let mut best: Option<(usize, S)> = None;
        for idx in 0..placement.len() {
            if phase_scope.should_terminate() {
                break;
            }
            let Some(m) = placement.move_at(phase_scope.score_director().working_solution(), idx) else {
                continue;
            };
            let Some(score) = evaluate(&m, phase_scope.score_director_mut())? else {
                continue;
            };
            phase_scope.record_move(false);
            if best.as_ref().map_or(true, |(_, best_score)| score > *best_score) {
                best = Some((idx, score));
            }
        }
        Ok(best.map(|(idx, _)| idx))
    }
}
