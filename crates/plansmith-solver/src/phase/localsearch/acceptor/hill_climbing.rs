//! Hill climbing acceptor.

use plansmith_core::{EntityRef, Score};

use super::Acceptor;

/// Accepts moves that do not make the score worse.
///
/// Equal moves are accepted so the search can cross plateaus.
#[derive(Debug, Clone, Copy, Default)]
pub struct HillClimbingAcceptor;

impl HillClimbingAcceptor {
    pub fn new() -> Self {
        Self
    }
}

impl<S: Score> Acceptor<S> for HillClimbingAcceptor {
    fn is_accepted(&mut self, last_step_score: &S, move_score: &S, _moved: &[EntityRef]) -> bool {
        move_score >= last_step_score
    }
}
