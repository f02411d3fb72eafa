//! Composite termination.

use plansmith_core::Score;

use super::Termination;
use crate::scope::SolverScope;

/// Terminates when any of its children does. Empty never terminates.
#[derive(Debug)]
pub struct OrTermination<S: Score> {
    terminations: Vec<Box<dyn Termination<S>>>,
}

impl<S: Score> OrTermination<S> {
    pub fn new(terminations: Vec<Box<dyn Termination<S>>>) -> Self {
        Self { terminations }
    }

    pub fn push(&mut self, termination: impl Termination<S> + 'static) {
        self.terminations.push(Box::new(termination));
    }

    pub fn len(&self) -> usize {
        self.terminations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminations.is_empty()
    }
}

impl<S: Score> Default for OrTermination<S> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<S: Score> Termination<S> for OrTermination<S> {
    fn is_terminated(&self, solver_scope: &SolverScope<S>) -> bool {
        self.terminations
            .iter()
            .any(|t| t.is_terminated(solver_scope))
    }
}
