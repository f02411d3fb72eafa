//! Phase-level scope.

use std::time::{Duration, Instant};

use plansmith_core::Score;
use plansmith_scoring::ScoreDirector;

use super::SolverScope;

pub struct PhaseScope<'a, S: Score> {
    solver_scope: &'a mut SolverScope<S>,
    phase_index: usize,
    starting_score: Option<S>,
    step_count: u64,
    moves_evaluated: u64,
    start_time: Instant,
}

impl<'a, S: Score> PhaseScope<'a, S> {
    pub fn new(solver_scope: &'a mut SolverScope<S>, phase_index: usize) -> Self {
        let starting_score = solver_scope.best_score().copied();
        Self {
            solver_scope,
            phase_index,
            starting_score,
            step_count: 0,
            moves_evaluated: 0,
            start_time: Instant::now(),
        }
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn starting_score(&self) -> Option<&S> {
        self.starting_score.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn increment_step_count(&mut self) -> u64 {
        self.step_count += 1;
        self.solver_scope.increment_step_count();
        self.step_count
    }

    pub fn moves_evaluated(&self) -> u64 {
        self.moves_evaluated
    }

    pub fn record_move(&mut self, accepted: bool) {
        self.moves_evaluated += 1;
        self.solver_scope.record_move(accepted);
    }

    /// Moves evaluated per second in this phase.
    pub fn speed(&self) -> u64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            (self.moves_evaluated as f64 / secs) as u64
        } else {
            0
        }
    }

    pub fn solver_scope(&self) -> &SolverScope<S> {
        self.solver_scope
    }

    pub fn solver_scope_mut(&mut self) -> &mut SolverScope<S> {
        self.solver_scope
    }

    pub fn score_director(&self) -> &ScoreDirector<S> {
        self.solver_scope.score_director()
    }

    pub fn score_director_mut(&mut self) -> &mut ScoreDirector<S> {
        self.solver_scope.score_director_mut()
    }

    pub fn calculate_score(&mut self) -> S {
        self.solver_scope.calculate_score()
    }

    pub fn update_best_solution(&mut self) -> bool {
        self.solver_scope.update_best_solution()
    }

    pub fn should_terminate(&self) -> bool {
        self.solver_scope.should_terminate()
    }

    /// Best score label for phase summaries.
    pub fn best_score_label(&self) -> String {
        self.solver_scope
            .best_score()
            .map_or_else(|| "none".to_string(), |s| s.to_string())
    }
}
