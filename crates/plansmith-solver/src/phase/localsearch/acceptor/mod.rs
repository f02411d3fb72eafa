//! Acceptors for local search move acceptance.
//!
//! Acceptors decide whether a candidate move may become the next step by
//! comparing its score with the last step score. Swapping the acceptor
//! changes how the search escapes local optima without touching move
//! selection or scoring.

mod hill_climbing;
mod late_acceptance;
mod simulated_annealing;
mod tabu_search;

use std::fmt::Debug;

use plansmith_core::{EntityRef, Score};

pub use hill_climbing::HillClimbingAcceptor;
pub use late_acceptance::LateAcceptanceAcceptor;
pub use simulated_annealing::SimulatedAnnealingAcceptor;
pub use tabu_search::TabuSearchAcceptor;

/// Trait for accepting or rejecting moves in local search.
pub trait Acceptor<S: Score>: Send + Debug {
    /// Returns true if a move resulting in `move_score` should be accepted,
    /// given the previous step's score. `moved` are the entities the move
    /// changes.
    fn is_accepted(&mut self, last_step_score: &S, move_score: &S, moved: &[EntityRef]) -> bool;

    /// Called when a phase starts.
    fn phase_started(&mut self, _initial_score: &S) {}

    /// Called when a phase ends.
    fn phase_ended(&mut self) {}

    /// Called when a step starts.
    fn step_started(&mut self) {}

    /// Called when a step ends with an accepted move.
    fn step_ended(&mut self, _step_score: &S, _moved: &[EntityRef]) {}
}

impl<S: Score, A: Acceptor<S> + ?Sized> Acceptor<S> for Box<A> {
    fn is_accepted(&mut self, last_step_score: &S, move_score: &S, moved: &[EntityRef]) -> bool {
        (**self).is_accepted(last_step_score, move_score, moved)
    }

    fn phase_started(&mut self, initial_score: &S) {
        (**self).phase_started(initial_score);
    }

    fn phase_ended(&mut self) {
        (**self).phase_ended();
    }

    fn step_started(&mut self) {
        (**self).step_started();
    }

    fn step_ended(&mut self, step_score: &S, moved: &[EntityRef]) {
        (**self).step_ended(step_score, moved);
    }
}
