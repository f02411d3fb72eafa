//! Solver phases.
//!
//! - [`ConstructionHeuristicPhase`](construction::ConstructionHeuristicPhase):
//!   assigns every unassigned planning variable once
//! - [`LocalSearchPhase`](localsearch::LocalSearchPhase): improves a complete
//!   solution until terminated

pub mod construction;
pub mod localsearch;

use std::fmt::Debug;

use plansmith_core::Score;

use crate::error::SolverError;
use crate::scope::SolverScope;

/// A phase of the solving process.
///
/// Phases run in sequence. Each one works on the working solution owned by
/// the solver scope and records improvements of the best solution there.
pub trait Phase<S: Score>: Send + Debug {
    /// Executes this phase. `phase_index` is its position in the solver.
    fn solve(&mut self, solver_scope: &mut SolverScope<S>, phase_index: usize) -> Result<(), SolverError>;

    /// Returns the name of this phase type.
    fn phase_type_name(&self) -> &'static str;
}
