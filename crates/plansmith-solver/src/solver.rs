//! Solver implementation.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use plansmith_config::{EnvironmentMode, SolverConfig};
use plansmith_core::{ParseableScore, Problem};
use plansmith_scoring::{ConstraintGraph, ConstraintWeightOverrides, ScoreDirector, ScoreMode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::builder::{PhaseBuilder, TerminationBuilder};
use crate::error::SolverError;
use crate::scope::{BestSolutionCallback, SolverScope};
use crate::stats::SolverStats;

/// Seed used in reproducible mode when none is configured.
const DEFAULT_SEED: u64 = 0;

/// Lifecycle of one solve.
///
/// `Initializing -> Constructing -> Improving -> Terminated`; phases that
/// are not configured are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverState {
    Initializing,
    Constructing,
    Improving,
    Terminated,
}

/// Outcome of a solve.
#[derive(Debug, Clone)]
pub struct SolveResult<S: ParseableScore> {
    /// The best solution found, with its score set.
    pub solution: Problem<S>,
    pub score: S,
    pub stats: SolverStats,
    /// True when the solve ended on an external request.
    pub terminated_early: bool,
}

/// The main solver that optimizes planning problems.
///
/// Built once from a constraint graph and a [`SolverConfig`]; every
/// [`solve`](Self::solve) builds fresh phases against the given problem. The
/// early termination flag and the state cell can be shared with other
/// threads before solving starts.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use plansmith_config::{SolverConfig, TerminationConfig};
/// use plansmith_solver::Solver;
/// use plansmith_test::flight_crew;
///
/// let problem = flight_crew::generate(0, 4, 4);
/// let graph = flight_crew::constraint_graph(Arc::clone(problem.descriptor()));
/// let config = SolverConfig::new()
///     .with_random_seed(1)
///     .with_termination(TerminationConfig {
///         step_count_limit: Some(50),
///         ..Default::default()
///     });
///
/// let mut solver = Solver::new(graph, config).unwrap();
/// let result = solver.solve(problem).unwrap();
/// assert_eq!(result.solution.score(), Some(result.score));
/// ```
pub struct Solver<S: ParseableScore> {
    graph: Arc<ConstraintGraph<S>>,
    config: SolverConfig,
    terminate_early_flag: Arc<AtomicBool>,
    solving: Arc<AtomicBool>,
    state: Arc<Mutex<SolverState>>,
    best_solution_callback: Option<BestSolutionCallback<S>>,
}

impl<S: ParseableScore> Debug for Solver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("constraints", &self.graph.len())
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl<S: ParseableScore> Solver<S> {
    /// Creates a solver, applying the configured constraint weights.
    ///
    /// Configuration errors surface here, before any solve starts.
    pub fn new(graph: Arc<ConstraintGraph<S>>, config: SolverConfig) -> Result<Self, SolverError> {
        config
            .validate()
            .map_err(|e| SolverError::Config(e.to_string()))?;
        TerminationBuilder::build::<S>(config.termination.as_ref())?;

        let weights = config
            .score_director
            .as_ref()
            .map(|c| &c.constraint_weights)
            .filter(|w| !w.is_empty());
        let graph = match weights {
            Some(weights) => Arc::new(graph.with_overrides(&parse_weights(weights)?)?),
            None => graph,
        };

        Ok(Self {
            graph,
            config,
            terminate_early_flag: Arc::new(AtomicBool::new(false)),
            solving: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(SolverState::Initializing)),
            best_solution_callback: None,
        })
    }

    /// Called with every new best solution. Consumed by the next solve.
    pub fn with_best_solution_callback(mut self, callback: BestSolutionCallback<S>) -> Self {
        self.best_solution_callback = Some(callback);
        self
    }

    pub fn graph(&self) -> &Arc<ConstraintGraph<S>> {
        &self.graph
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Requests early termination from any thread.
    ///
    /// Returns false if no solve is running.
    pub fn terminate_early(&self) -> bool {
        if self.solving.load(Ordering::SeqCst) {
            self.terminate_early_flag.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    /// The flag checked between move evaluations; setting it ends the solve.
    pub fn terminate_early_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate_early_flag)
    }

    pub fn is_solving(&self) -> bool {
        self.solving.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SolverState {
        *self.state.lock()
    }

    /// The state cell, readable while another thread solves.
    pub fn state_handle(&self) -> Arc<Mutex<SolverState>> {
        Arc::clone(&self.state)
    }

    /// Solves `problem` until a termination fires or every phase is done.
    ///
    /// Always returns a solution, possibly infeasible. A termination request
    /// made before the solve starts is honoured at the first check.
    pub fn solve(&mut self, problem: Problem<S>) -> Result<SolveResult<S>, SolverError> {
        self.solving.store(true, Ordering::SeqCst);
        let result = self.run(problem);
        *self.state.lock() = SolverState::Terminated;
        self.solving.store(false, Ordering::SeqCst);
        self.terminate_early_flag.store(false, Ordering::SeqCst);
        result
    }

    fn run(&mut self, problem: Problem<S>) -> Result<SolveResult<S>, SolverError> {
        *self.state.lock() = SolverState::Initializing;
        let mode = if self.config.score_director.as_ref().is_some_and(|c| c.full_recompute) {
            ScoreMode::FullRecompute
        } else {
            ScoreMode::Incremental
        };
        let entity_count = problem.entity_count();
        let value_count = value_count(&problem);
        let director = ScoreDirector::with_mode(problem, Arc::clone(&self.graph), mode)?;

        let seed = match (self.config.random_seed, self.config.environment_mode) {
            (Some(seed), _) => Some(seed),
            (None, EnvironmentMode::NonReproducible) => None,
            (None, _) => Some(DEFAULT_SEED),
        };
        let mut solver_scope = match seed {
            Some(seed) => SolverScope::with_seed(director, seed),
            None => SolverScope::new(director),
        }
        .with_state(Arc::clone(&self.state))
        .with_environment_mode(self.config.environment_mode)
        .with_termination(TerminationBuilder::build(self.config.termination.as_ref())?);
        if let Some(callback) = self.best_solution_callback.take() {
            solver_scope = solver_scope.with_best_solution_callback(callback);
        }
        solver_scope.set_terminate_early_flag(Arc::clone(&self.terminate_early_flag));

        let phase_seed = seed.unwrap_or_else(rand::random);
        let mut phases = PhaseBuilder::build(&self.config.phases, solver_scope.working_solution(), phase_seed)?;

        info!(
            event = "solve_start",
            entity_count = entity_count,
            value_count = value_count,
            phases = phases.len(),
            constraints = self.graph.len(),
        );
        solver_scope.start_solving();

        for (index, phase) in phases.iter_mut().enumerate() {
            if solver_scope.should_terminate() {
                break;
            }
            if let Err(e) = phase.solve(&mut solver_scope, index) {
                solver_scope.set_state(SolverState::Terminated);
                return Err(e);
            }
        }

        let terminated_early = solver_scope.is_terminate_early();
        // a solve cancelled before any phase still reports its input
        solver_scope.update_best_solution();
        solver_scope.set_state(SolverState::Terminated);

        let (solution, stats) = solver_scope.take_best_or_working_solution();
        let score = solution
            .score()
            .unwrap_or_else(|| self.graph.evaluate(&solution));
        info!(
            event = "solve_end",
            score = %score,
            feasible = score.is_feasible(),
            steps = stats.step_count,
            moves_evaluated = stats.moves_evaluated,
            duration_ms = stats.elapsed().as_millis() as u64,
            terminated_early = terminated_early,
        );
        Ok(SolveResult {
            solution,
            score,
            stats,
            terminated_early,
        })
    }
}

/// Constraint weights as written in configuration, e.g. `"0hard/-2soft"`.
fn parse_weights<S: ParseableScore>(weights: &BTreeMap<String, String>) -> Result<ConstraintWeightOverrides<S>, SolverError> {
    let mut overrides = ConstraintWeightOverrides::new();
    for (name, weight) in weights {
        overrides.put(name.clone(), S::parse(weight)?);
    }
    Ok(overrides)
}

/// Candidate values summed over every planning variable of every entity.
fn value_count<S: ParseableScore>(problem: &Problem<S>) -> usize {
    let descriptor = problem.descriptor();
    problem
        .entity_refs()
        .filter_map(|e| Some((e, descriptor.entity_class(e.class)?)))
        .flat_map(|(e, class)| class.variables().map(move |field| (e.class, field)).collect::<Vec<_>>())
        .filter_map(|(class, field)| problem.domain(class, field))
        .fold(0usize, |total, domain| total.saturating_add(domain.len()))
}
