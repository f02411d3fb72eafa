//! Shared helpers for unit tests.

use std::sync::Arc;

use plansmith_core::HardSoftScore;
use plansmith_scoring::ScoreDirector;
use plansmith_test::{flight_crew, tournament};

use crate::scope::SolverScope;

pub fn crew_director(seed: u64) -> ScoreDirector<HardSoftScore> {
    let problem = flight_crew::generate(seed, 6, 5);
    let graph = flight_crew::constraint_graph(Arc::clone(problem.descriptor()));
    ScoreDirector::new(problem, graph).unwrap()
}

pub fn tournament_director(seed: u64) -> ScoreDirector<tournament::Score> {
    let problem = tournament::generate(seed, 5, 8, 2);
    let graph = tournament::constraint_graph(Arc::clone(problem.descriptor()));
    ScoreDirector::new(problem, graph).unwrap()
}

/// A started scope over a small flight crew instance.
pub fn crew_scope(seed: u64) -> SolverScope<HardSoftScore> {
    let mut scope = SolverScope::with_seed(crew_director(seed), seed);
    scope.start_solving();
    scope
}
