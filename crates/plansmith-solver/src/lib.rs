//! Plansmith solver engine
//!
//! This crate provides the search side of plansmith:
//! - Moves and move selectors over planning variables
//! - Construction heuristic and local search phases
//! - Acceptors, foragers and termination conditions
//! - The [`Solver`] state machine, built from a [`SolverConfig`](plansmith_config::SolverConfig)
//! - [`SolverManager`] for concurrent, cancellable jobs with bounded retention

pub mod builder;
pub mod error;
pub mod event;
pub mod heuristic;
pub mod manager;
pub mod phase;
pub mod scope;
pub mod solver;
pub mod stats;
pub mod termination;

#[cfg(test)]
mod test_utils;

pub use builder::{AcceptorBuilder, ForagerBuilder, MoveSelectorBuilder, PhaseBuilder, TerminationBuilder};
pub use error::{ManagerError, SolverError};
pub use event::{LoggingEventListener, SolverEvent, SolverEventListener};
pub use heuristic::{
    ChangeMove, ChangeMoveSelector, EitherMove, Move, MoveSelector, MoveUndo, SwapMove,
    SwapMoveSelector, UnionMoveSelector,
};
pub use manager::{JobRegistry, SolverManager, SolverStatus};
pub use phase::construction::{
    BestFitForager, ConstructionForager, ConstructionHeuristicPhase, FirstFitForager,
};
pub use phase::localsearch::{
    Acceptor, AcceptedCountForager, FirstAcceptedForager, HillClimbingAcceptor,
    LateAcceptanceAcceptor, LocalSearchForager, LocalSearchPhase, SimulatedAnnealingAcceptor,
    TabuSearchAcceptor,
};
pub use phase::Phase;
pub use scope::{BestSolutionCallback, PhaseScope, SolverScope};
pub use solver::{SolveResult, Solver, SolverState};
pub use stats::SolverStats;
pub use termination::{
    BestScoreFeasibleTermination, BestScoreTermination, ExternalTermination, OrTermination,
    StepCountTermination, Termination, TimeTermination, UnimprovedStepCountTermination,
    UnimprovedTimeTermination,
};
