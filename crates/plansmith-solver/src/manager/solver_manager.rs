//! SolverManager implementation.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use plansmith_config::SolverManagerConfig;
use plansmith_core::{ParseableScore, Problem};
use plansmith_scoring::{ConstraintGraph, ScoreDirectorError, ScoreExplanation};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use super::registry::JobRegistry;
use super::SolverStatus;
use crate::error::{ManagerError, SolverError};
use crate::event::{SolverEvent, SolverEventListener};
use crate::solver::Solver;

type Subscribers<S> = Arc<Mutex<Vec<UnboundedSender<SolverEvent<S>>>>>;

/// Runs solves off the caller's thread, one per problem id.
///
/// Each submitted problem is solved on a dedicated named thread. Progress is
/// observable through the job registry ([`get_status`](Self::get_status),
/// [`get_best`](Self::get_best)), through a per-job listener, and through
/// channels opened with [`subscribe`](Self::subscribe). Dropping the manager
/// requests termination of every running job.
pub struct SolverManager<S: ParseableScore> {
    graph: Arc<ConstraintGraph<S>>,
    config: SolverManagerConfig,
    registry: Arc<JobRegistry<S>>,
    subscribers: Subscribers<S>,
}

impl<S: ParseableScore> SolverManager<S> {
    /// Creates a manager for problems scored by `graph`.
    ///
    /// The solver configuration is validated here, so a bad configuration
    /// is reported before any job is accepted.
    pub fn new(graph: Arc<ConstraintGraph<S>>, config: SolverManagerConfig) -> Result<Self, ManagerError> {
        config
            .validate()
            .map_err(|e| SolverError::Config(e.to_string()))?;
        // weights are applied once; jobs share the reweighted graph
        let reweighted = Solver::new(graph, config.solver.clone())?;
        let graph = Arc::clone(reweighted.graph());
        let mut config = config;
        if let Some(score_director) = config.solver.score_director.as_mut() {
            score_director.constraint_weights.clear();
        }
        Ok(Self {
            registry: Arc::new(JobRegistry::new(config.retained_jobs)),
            graph,
            config,
            subscribers: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn graph(&self) -> &Arc<ConstraintGraph<S>> {
        &self.graph
    }

    pub fn registry(&self) -> &Arc<JobRegistry<S>> {
        &self.registry
    }

    /// Starts solving `problem` under `problem_id` without blocking.
    pub fn submit(&self, problem_id: impl Into<String>, problem: Problem<S>) -> Result<(), ManagerError> {
        self.spawn(problem_id.into(), problem, None)
    }

    /// Like [`submit`](Self::submit), calling `listener` with each event of this job.
    pub fn submit_with_listener<L>(
        &self,
        problem_id: impl Into<String>,
        problem: Problem<S>,
        listener: L,
    ) -> Result<(), ManagerError>
    where
        L: SolverEventListener<S> + 'static,
    {
        self.spawn(problem_id.into(), problem, Some(Box::new(listener)))
    }

    fn spawn(
        &self,
        problem_id: String,
        problem: Problem<S>,
        listener: Option<Box<dyn SolverEventListener<S>>>,
    ) -> Result<(), ManagerError> {
        if !self.graph.accepts(&problem) {
            return Err(SolverError::from(ScoreDirectorError::DescriptorMismatch).into());
        }
        let solver = Solver::new(Arc::clone(&self.graph), self.config.solver.clone())?;
        self.registry
            .insert(&problem_id, Arc::new(problem.clone()), solver.terminate_early_flag())?;

        let sink = Arc::new(Mutex::new(EventSink {
            listener,
            subscribers: Arc::clone(&self.subscribers),
        }));
        let job = Job {
            problem_id: problem_id.clone(),
            problem,
            solver,
            registry: Arc::clone(&self.registry),
            sink,
        };
        let spawned = thread::Builder::new()
            .name(format!("{}-{}", self.config.thread_name_prefix, problem_id))
            .spawn(move || job.run());
        if let Err(e) = spawned {
            self.registry.remove(&problem_id);
            return Err(ManagerError::Spawn(e));
        }
        Ok(())
    }

    /// Status of a job; ids that were never submitted or were evicted are not solving.
    pub fn get_status(&self, problem_id: &str) -> SolverStatus {
        self.registry.status(problem_id)
    }

    /// Best solution so far, or the final one once the job completed.
    pub fn get_best(&self, problem_id: &str) -> Result<Arc<Problem<S>>, ManagerError> {
        self.registry.best(problem_id)
    }

    /// The error that ended a failed job.
    pub fn get_error(&self, problem_id: &str) -> Result<Option<SolverError>, ManagerError> {
        self.registry.error(problem_id)
    }

    /// Requests cooperative cancellation of a job.
    ///
    /// Terminating a job that already completed does nothing.
    pub fn terminate(&self, problem_id: &str) -> Result<SolverStatus, ManagerError> {
        self.registry.terminate(problem_id)
    }

    /// Requests cancellation of every running job, returning how many were running.
    pub fn terminate_all(&self) -> usize {
        self.registry.terminate_all()
    }

    pub fn active_count(&self) -> usize {
        self.registry.active_count()
    }

    /// Opens a channel receiving the events of every job submitted from now on.
    ///
    /// Usable from async code with `recv().await` or from plain threads with
    /// `blocking_recv()`. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> UnboundedReceiver<SolverEvent<S>> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.lock().push(sender);
        receiver
    }

    /// Per-constraint breakdown of `problem` without solving it.
    pub fn analyze(&self, problem: &Problem<S>) -> Result<ScoreExplanation<S>, ManagerError> {
        if !self.graph.accepts(problem) {
            return Err(SolverError::from(ScoreDirectorError::DescriptorMismatch).into());
        }
        Ok(self.graph.explain(problem))
    }
}

impl<S: ParseableScore> Drop for SolverManager<S> {
    fn drop(&mut self) {
        let running = self.registry.terminate_all();
        if running > 0 {
            debug!(event = "manager_dropped", running = running);
        }
    }
}

impl<S: ParseableScore> std::fmt::Debug for SolverManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverManager")
            .field("constraints", &self.graph.len())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Fans one job's events out to its listener and every subscriber.
struct EventSink<S: ParseableScore> {
    listener: Option<Box<dyn SolverEventListener<S>>>,
    subscribers: Subscribers<S>,
}

impl<S: ParseableScore> EventSink<S> {
    fn emit(&mut self, event: SolverEvent<S>) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_event(&event);
        }
        self.subscribers
            .lock()
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

/// Everything a solver thread owns.
struct Job<S: ParseableScore> {
    problem_id: String,
    problem: Problem<S>,
    solver: Solver<S>,
    registry: Arc<JobRegistry<S>>,
    sink: Arc<Mutex<EventSink<S>>>,
}

impl<S: ParseableScore> Job<S> {
    fn run(self) {
        let Job {
            problem_id,
            problem,
            solver,
            registry,
            sink,
        } = self;

        let callback_sink = Arc::clone(&sink);
        let callback_registry = Arc::clone(&registry);
        let callback_id = problem_id.clone();
        let mut solver = solver.with_best_solution_callback(Box::new(move |solution, score| {
            let solution = Arc::new(solution.clone());
            callback_registry.update_best(&callback_id, Arc::clone(&solution));
            callback_sink.lock().emit(SolverEvent::BestSolutionChanged {
                problem_id: callback_id.clone(),
                solution,
                score,
            });
        }));

        registry.mark_active(&problem_id);
        sink.lock().emit(SolverEvent::SolvingStarted {
            problem_id: problem_id.clone(),
        });

        match solver.solve(problem) {
            Ok(result) => {
                let solution = Arc::new(result.solution);
                registry.complete(&problem_id, Arc::clone(&solution), result.terminated_early);
                sink.lock().emit(SolverEvent::SolvingEnded {
                    problem_id,
                    solution,
                    score: result.score,
                    terminated_early: result.terminated_early,
                });
            }
            Err(error) => {
                warn!(event = "job_failed", problem_id = %problem_id, error = %error);
                registry.fail(&problem_id, error.clone());
                sink.lock().emit(SolverEvent::SolvingFailed { problem_id, error });
            }
        }
    }
}
