//! Local search phase.
//!
//! Improves a complete solution by repeatedly applying a move that the
//! acceptor lets through.

mod acceptor;
mod forager;
mod phase;


pub use acceptor::{
    Acceptor, HillClimbingAcceptor, LateAcceptanceAcceptor, SimulatedAnnealingAcceptor,
    TabuSearchAcceptor,
};
pub use forager::{AcceptedCountForager, FirstAcceptedForager, LocalSearchForager};
pub use phase::{LocalSearchPhase, DEFAULT_MOVES_PER_STEP};
