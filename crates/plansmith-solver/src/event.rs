//! Events raised while a job is solved.
//!
//! Every job reports its lifecycle as a stream of [`SolverEvent`]s: one
//! `SolvingStarted`, a `BestSolutionChanged` per improvement, then exactly
//! one of `SolvingEnded` or `SolvingFailed`. Solutions carried by events are
//! snapshots; the running solve never touches them again.
//!
//! ```
//! use plansmith_core::HardSoftScore;
//! use plansmith_solver::event::{SolverEvent, SolverEventListener};
//!
//! let mut seen = Vec::new();
//! let mut listener = |event: &SolverEvent<HardSoftScore>| seen.push(event.problem_id().to_string());
//! listener.on_event(&SolverEvent::SolvingStarted {
//!     problem_id: "p1".to_string(),
//! });
//! assert_eq!(seen, ["p1"]);
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use plansmith_core::{Problem, Score};
use tracing::info;

use crate::error::SolverError;

#[derive(Debug, Clone)]
pub enum SolverEvent<S: Score> {
    SolvingStarted {
        problem_id: String,
    },
    BestSolutionChanged {
        problem_id: String,
        solution: Arc<Problem<S>>,
        score: S,
    },
    SolvingEnded {
        problem_id: String,
        solution: Arc<Problem<S>>,
        score: S,
        /// True when the job was cancelled.
        terminated_early: bool,
    },
    SolvingFailed {
        problem_id: String,
        error: SolverError,
    },
}

impl<S: Score> SolverEvent<S> {
    pub fn problem_id(&self) -> &str {
        match self {
            Self::SolvingStarted { problem_id }
            | Self::BestSolutionChanged { problem_id, .. }
            | Self::SolvingEnded { problem_id, .. }
            | Self::SolvingFailed { problem_id, .. } => problem_id,
        }
    }

    /// The solution carried by the event, if any.
    pub fn solution(&self) -> Option<&Arc<Problem<S>>> {
        match self {
            Self::BestSolutionChanged { solution, .. } | Self::SolvingEnded { solution, .. } => {
                Some(solution)
            }
            _ => None,
        }
    }

    /// True for the last event of a job.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::SolvingEnded { .. } | Self::SolvingFailed { .. })
    }
}

/// Receives the events of one job, on that job's solver thread.
///
/// Implemented for any `FnMut(&SolverEvent<S>) + Send` closure.
pub trait SolverEventListener<S: Score>: Send {
    fn on_event(&mut self, event: &SolverEvent<S>);
}

impl<S: Score, F> SolverEventListener<S> for F
where
    F: FnMut(&SolverEvent<S>) + Send,
{
    fn on_event(&mut self, event: &SolverEvent<S>) {
        self(event)
    }
}

/// Logs every event at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventListener;

impl<S: Score> SolverEventListener<S> for LoggingEventListener {
    fn on_event(&mut self, event: &SolverEvent<S>) {
        match event {
            SolverEvent::SolvingStarted { problem_id } => {
                info!(event = "job_started", problem_id = %problem_id);
            }
            SolverEvent::BestSolutionChanged { problem_id, score, .. } => {
                info!(event = "job_best", problem_id = %problem_id, score = %score);
            }
            SolverEvent::SolvingEnded {
                problem_id,
                score,
                terminated_early,
                ..
            } => {
                info!(
                    event = "job_ended",
                    problem_id = %problem_id,
                    score = %score,
                    terminated_early = terminated_early,
                );
            }
            SolverEvent::SolvingFailed { problem_id, error } => {
                info!(event = "job_failed", problem_id = %problem_id, error = %error);
            }
        }
    }
}
