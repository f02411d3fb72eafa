//! Termination conditions for solving.
//!
//! Terminations are checked between steps and, in local search, between
//! move evaluations. They only read the solver scope, so they hold no state
//! of their own.

mod best_score;
mod composite;
mod external;
mod step_count;
mod time;
mod unimproved;

use std::fmt::Debug;

use plansmith_core::Score;

use crate::scope::SolverScope;

pub use best_score::{BestScoreFeasibleTermination, BestScoreTermination};
pub use composite::OrTermination;
pub use external::ExternalTermination;
pub use step_count::StepCountTermination;
pub use time::TimeTermination;
pub use unimproved::{UnimprovedStepCountTermination, UnimprovedTimeTermination};

/// Trait for determining when to stop solving.
pub trait Termination<S: Score>: Send + Debug {
    /// Returns true if solving should terminate.
    fn is_terminated(&self, solver_scope: &SolverScope<S>) -> bool;
}

#[cfg(test)]
mod tests;
