//! Solver-level scope.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use plansmith_config::EnvironmentMode;
use plansmith_core::{Problem, Score};
use plansmith_scoring::ScoreDirector;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::error::SolverError;
use crate::solver::SolverState;
use crate::stats::SolverStats;
use crate::termination::Termination;

/// Called with a snapshot of every new best solution and its score.
pub type BestSolutionCallback<S> = Box<dyn FnMut(&Problem<S>, S) + Send>;

/// Top-level scope for the entire solving process.
///
/// Owns the score director, so the working solution is only ever touched
/// by the thread running the solve.
pub struct SolverScope<S: Score> {
    score_director: ScoreDirector<S>,
    best_solution: Option<Problem<S>>,
    best_score: Option<S>,
    rng: StdRng,
    start_time: Option<Instant>,
    total_step_count: u64,
    last_improvement_step: u64,
    last_improvement_time: Option<Instant>,
    stats: SolverStats,
    state: Arc<Mutex<SolverState>>,
    terminate_early_flag: Option<Arc<AtomicBool>>,
    termination: Option<Box<dyn Termination<S>>>,
    best_solution_callback: Option<BestSolutionCallback<S>>,
    environment_mode: EnvironmentMode,
}

impl<S: Score> SolverScope<S> {
    pub fn new(score_director: ScoreDirector<S>) -> Self {
        Self::with_rng(score_director, StdRng::from_os_rng())
    }

    pub fn with_seed(score_director: ScoreDirector<S>, seed: u64) -> Self {
        Self::with_rng(score_director, StdRng::seed_from_u64(seed))
    }

    fn with_rng(score_director: ScoreDirector<S>, rng: StdRng) -> Self {
        Self {
            score_director,
            best_solution: None,
            best_score: None,
            rng,
            start_time: None,
            total_step_count: 0,
            last_improvement_step: 0,
            last_improvement_time: None,
            stats: SolverStats::default(),
            state: Arc::new(Mutex::new(SolverState::Initializing)),
            terminate_early_flag: None,
            termination: None,
            best_solution_callback: None,
            environment_mode: EnvironmentMode::default(),
        }
    }

    pub fn with_termination(mut self, termination: Box<dyn Termination<S>>) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_best_solution_callback(mut self, callback: BestSolutionCallback<S>) -> Self {
        self.best_solution_callback = Some(callback);
        self
    }

    /// Shares the state cell with the owner of the solver.
    pub fn with_state(mut self, state: Arc<Mutex<SolverState>>) -> Self {
        self.state = state;
        self
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    /// Verifies the incremental score against a full recompute after a step
    /// in [`EnvironmentMode::FullAssert`].
    pub fn assert_step(&mut self) -> Result<(), SolverError> {
        if self.environment_mode == EnvironmentMode::FullAssert {
            self.score_director.assert_consistent()?;
        }
        Ok(())
    }

    /// Verifies the score at the end of a phase in either assert mode.
    pub fn assert_phase(&mut self) -> Result<(), SolverError> {
        if self.environment_mode.is_asserted() {
            self.score_director.assert_consistent()?;
        }
        Ok(())
    }

    pub fn start_solving(&mut self) {
        let now = Instant::now();
        self.start_time = Some(now);
        self.last_improvement_time = Some(now);
        self.total_step_count = 0;
        self.last_improvement_step = 0;
        self.stats.start();
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|t| t.elapsed())
    }

    pub fn state(&self) -> SolverState {
        *self.state.lock()
    }

    pub fn set_state(&mut self, state: SolverState) {
        let previous = std::mem::replace(&mut *self.state.lock(), state);
        if previous != state {
            debug!(event = "state", from = ?previous, to = ?state);
        }
    }

    pub fn score_director(&self) -> &ScoreDirector<S> {
        &self.score_director
    }

    pub fn score_director_mut(&mut self) -> &mut ScoreDirector<S> {
        &mut self.score_director
    }

    /// The score director and the random generator, borrowed together.
    pub fn director_and_rng(&mut self) -> (&mut ScoreDirector<S>, &mut StdRng) {
        (&mut self.score_director, &mut self.rng)
    }

    pub fn working_solution(&self) -> &Problem<S> {
        self.score_director.working_solution()
    }

    pub fn calculate_score(&mut self) -> S {
        self.score_director.calculate_score()
    }

    pub fn best_solution(&self) -> Option<&Problem<S>> {
        self.best_solution.as_ref()
    }

    pub fn best_score(&self) -> Option<&S> {
        self.best_score.as_ref()
    }

    /// Snapshots the working solution if it beats the best so far.
    ///
    /// Returns true when the best solution changed.
    pub fn update_best_solution(&mut self) -> bool {
        let current_score = self.score_director.calculate_score();
        let is_better = match &self.best_score {
            None => true,
            Some(best) => current_score > *best,
        };
        if !is_better {
            return false;
        }

        let snapshot = self.score_director.clone_working_solution();
        if let Some(callback) = self.best_solution_callback.as_mut() {
            callback(&snapshot, current_score);
        }
        info!(
            event = "new_best",
            score = %current_score,
            step = self.total_step_count,
            feasible = current_score.is_feasible(),
        );
        self.best_solution = Some(snapshot);
        self.best_score = Some(current_score);
        self.last_improvement_step = self.total_step_count;
        self.last_improvement_time = Some(Instant::now());
        self.stats.record_improvement();
        true
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn increment_step_count(&mut self) -> u64 {
        self.total_step_count += 1;
        self.stats.record_step();
        self.total_step_count
    }

    pub fn total_step_count(&self) -> u64 {
        self.total_step_count
    }

    /// Steps taken since the best score last improved.
    pub fn steps_since_improvement(&self) -> u64 {
        self.total_step_count - self.last_improvement_step
    }

    pub fn time_since_improvement(&self) -> Option<Duration> {
        self.last_improvement_time.map(|t| t.elapsed())
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    pub fn record_move(&mut self, accepted: bool) {
        self.stats.record_move(accepted);
    }

    pub fn set_terminate_early_flag(&mut self, flag: Arc<AtomicBool>) {
        self.terminate_early_flag = Some(flag);
    }

    pub fn is_terminate_early(&self) -> bool {
        self.terminate_early_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// True once cancellation was requested or the termination is met.
    pub fn should_terminate(&self) -> bool {
        self.is_terminate_early()
            || self
                .termination
                .as_ref()
                .is_some_and(|t| t.is_terminated(self))
    }

    /// Consumes the scope, returning the best solution, the working solution
    /// when there is none, together with the run statistics.
    pub fn take_best_or_working_solution(mut self) -> (Problem<S>, SolverStats) {
        self.stats.stop();
        let solution = match self.best_solution {
            Some(best) => best,
            None => self.score_director.take_solution(),
        };
        (solution, self.stats)
    }
}

impl<S: Score> std::fmt::Debug for SolverScope<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverScope")
            .field("best_score", &self.best_score)
            .field("total_step_count", &self.total_step_count)
            .field("termination", &self.termination)
            .finish()
    }
}
