//! External termination via a shared flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use plansmith_core::Score;

use super::Termination;
use crate::scope::SolverScope;

/// Terminates when another thread raises the flag.
#[derive(Debug, Clone)]
pub struct ExternalTermination {
    flag: Arc<AtomicBool>,
}

impl ExternalTermination {
    /// Creates a termination that checks the given flag.
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    pub fn flag(&self) -> &Arc<AtomicBool> {
        &self.flag
    }
}

impl<S: Score> Termination<S> for ExternalTermination {
    fn is_terminated(&self, _solver_scope: &SolverScope<S>) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
