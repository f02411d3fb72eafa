//! Late acceptance acceptor.

use plansmith_core::{EntityRef, Score};

use super::Acceptor;

/// Late acceptance acceptor - accepts moves that improve on a historical score.
///
/// Maintains a circular buffer of recent step scores and accepts a move that
/// is at least as good as the last step, or as the step `size` steps ago.
///
/// # Example
///
/// ```
/// use plansmith_core::HardSoftScore;
/// use plansmith_solver::phase::localsearch::{Acceptor, LateAcceptanceAcceptor};
///
/// let mut acceptor = LateAcceptanceAcceptor::<HardSoftScore>::new(2);
/// acceptor.phase_started(&HardSoftScore::of(0, -10));
/// acceptor.step_ended(&HardSoftScore::of(0, -8), &[]);
///
/// // worse than the last step, but not worse than the late score
/// assert!(acceptor.is_accepted(&HardSoftScore::of(0, -8), &HardSoftScore::of(0, -10), &[]));
/// ```
#[derive(Debug, Clone)]
pub struct LateAcceptanceAcceptor<S: Score> {
    late_acceptance_size: usize,
    score_history: Vec<S>,
    current_index: usize,
}

impl<S: Score> LateAcceptanceAcceptor<S> {
    /// Creates a new late acceptance acceptor keeping `late_acceptance_size`
    /// scores; a size of zero is treated as one.
    pub fn new(late_acceptance_size: usize) -> Self {
        let late_acceptance_size = late_acceptance_size.max(1);
        Self {
            late_acceptance_size,
            score_history: vec![S::zero(); late_acceptance_size],
            current_index: 0,
        }
    }
}

impl<S: Score> Default for LateAcceptanceAcceptor<S> {
    fn default() -> Self {
        Self::new(400)
    }
}

impl<S: Score> Acceptor<S> for LateAcceptanceAcceptor<S> {
    fn is_accepted(&mut self, last_step_score: &S, move_score: &S, _moved: &[EntityRef]) -> bool {
        move_score >= last_step_score || *move_score >= self.score_history[self.current_index]
    }

    fn phase_started(&mut self, initial_score: &S) {
        self.score_history.fill(*initial_score);
        self.current_index = 0;
    }

    fn step_ended(&mut self, step_score: &S, _moved: &[EntityRef]) {
        self.score_history[self.current_index] = *step_score;
        self.current_index = (self.current_index + 1) % self.late_acceptance_size;
    }
}
