//! Score-based termination conditions.

use plansmith_core::Score;

use super::Termination;
use crate::scope::SolverScope;

/// Terminates once the best score reaches a target.
#[derive(Debug, Clone)]
pub struct BestScoreTermination<S: Score> {
    target_score: S,
}

impl<S: Score> BestScoreTermination<S> {
    pub fn new(target_score: S) -> Self {
        Self { target_score }
    }
}

impl<S: Score> Termination<S> for BestScoreTermination<S> {
    fn is_terminated(&self, solver_scope: &SolverScope<S>) -> bool {
        solver_scope
            .best_score()
            .is_some_and(|score| *score >= self.target_score)
    }
}

/// Terminates once the best solution is feasible.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestScoreFeasibleTermination;

impl<S: Score> Termination<S> for BestScoreFeasibleTermination {
    fn is_terminated(&self, solver_scope: &SolverScope<S>) -> bool {
        solver_scope.best_score().is_some_and(|s| s.is_feasible())
    }
}
