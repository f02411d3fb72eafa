//! Concurrent job management.
//!
//! A [`SolverManager`] runs one solve per problem id on its own thread and
//! keeps the results in a bounded [`JobRegistry`].

mod registry;
mod solver_manager;

#[cfg(test)]
mod tests;

pub use registry::JobRegistry;
pub use solver_manager::SolverManager;

use serde::{Deserialize, Serialize};

/// Status of a solving job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    /// Finished, failed, or never submitted.
    NotSolving,
    /// Accepted, waiting for its thread to start.
    SolvingScheduled,
    SolvingActive,
}

impl SolverStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::NotSolving => "NOT_SOLVING",
            SolverStatus::SolvingScheduled => "SOLVING_SCHEDULED",
            SolverStatus::SolvingActive => "SOLVING_ACTIVE",
        }
    }

    pub fn is_solving(self) -> bool {
        !matches!(self, SolverStatus::NotSolving)
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
