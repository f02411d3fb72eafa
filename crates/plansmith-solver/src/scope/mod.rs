//! Scope hierarchy for solver execution.
//!
//! Scopes maintain state at different levels of the solving process:
//! - [`SolverScope`]: Top-level, holds working solution and best solution
//! - [`PhaseScope`]: Per-phase state

mod phase;
mod solver;

pub use phase::PhaseScope;
pub use solver::{BestSolutionCallback, SolverScope};

#[cfg(test)]
mod tests;
