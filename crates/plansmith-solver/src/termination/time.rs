//! Time-based termination.

use std::time::Duration;

use plansmith_core::Score;

use super::Termination;
use crate::scope::SolverScope;

/// Terminates once the solve has run for a fixed duration.
#[derive(Debug, Clone)]
pub struct TimeTermination {
    limit: Duration,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl<S: Score> Termination<S> for TimeTermination {
    fn is_terminated(&self, solver_scope: &SolverScope<S>) -> bool {
        solver_scope.elapsed().is_some_and(|e| e >= self.limit)
    }
}
