//! Termination conditions based on lack of improvement.

use std::time::Duration;

use plansmith_core::Score;

use super::Termination;
use crate::scope::SolverScope;

/// Terminates if the best score has not improved for a number of steps.
///
/// # Example
///
/// ```
/// use plansmith_solver::termination::UnimprovedStepCountTermination;
///
/// // Terminate after 100 steps without improvement
/// let term = UnimprovedStepCountTermination::new(100);
/// ```
#[derive(Debug, Clone)]
pub struct UnimprovedStepCountTermination {
    limit: u64,
}

impl UnimprovedStepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<S: Score> Termination<S> for UnimprovedStepCountTermination {
    fn is_terminated(&self, solver_scope: &SolverScope<S>) -> bool {
        solver_scope.steps_since_improvement() >= self.limit
    }
}

/// Terminates if the best score has not improved for a duration.
#[derive(Debug, Clone)]
pub struct UnimprovedTimeTermination {
    limit: Duration,
}

impl UnimprovedTimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl<S: Score> Termination<S> for UnimprovedTimeTermination {
    fn is_terminated(&self, solver_scope: &SolverScope<S>) -> bool {
        solver_scope
            .time_since_improvement()
            .is_some_and(|e| e >= self.limit)
    }
}
