//! Local search phase implementation.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use plansmith_core::Score;
use tracing::{debug, info, trace};

use crate::error::SolverError;
use crate::heuristic::r#move::{EitherMove, Move};
use crate::heuristic::selector::MoveSelector;
use crate::phase::localsearch::{Acceptor, LocalSearchForager};
use crate::phase::Phase;
use crate::scope::{PhaseScope, SolverScope};
use crate::solver::SolverState;

/// Random candidates drawn per step at most.
pub const DEFAULT_MOVES_PER_STEP: usize = 10_000;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Local search phase that improves an existing solution.
///
/// Each step:
/// 1. draws random candidate moves from the selector
/// 2. scores each candidate by doing and undoing it
/// 3. lets the acceptor decide and the forager collect
/// 4. applies the move the forager picks
///
/// Termination is checked before every candidate, so a cancellation
/// request is honoured within one move evaluation. The working solution is
/// always left at a completed step.
pub struct LocalSearchPhase<S, MS, A, Fo>
where
    S: Score,
    MS: MoveSelector<S>,
    A: Acceptor<S>,
    Fo: LocalSearchForager<S>,
{
    move_selector: MS,
    acceptor: A,
    forager: Fo,
    step_limit: Option<u64>,
    moves_per_step: usize,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, MS, A, Fo> LocalSearchPhase<S, MS, A, Fo>
where
    S: Score,
    MS: MoveSelector<S>,
    A: Acceptor<S>,
    Fo: LocalSearchForager<S>,
{
    /// Creates a new local search phase.
    pub fn new(move_selector: MS, acceptor: A, forager: Fo, step_limit: Option<u64>) -> Self {
        Self {
            move_selector,
            acceptor,
            forager,
            step_limit,
            moves_per_step: DEFAULT_MOVES_PER_STEP,
            _phantom: PhantomData,
        }
    }

    pub fn with_moves_per_step(mut self, moves_per_step: usize) -> Self {
        self.moves_per_step = moves_per_step.max(1);
        self
    }
}

impl<S, MS, A, Fo> Debug for LocalSearchPhase<S, MS, A, Fo>
where
    S: Score,
    MS: MoveSelector<S>,
    A: Acceptor<S>,
    Fo: LocalSearchForager<S>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSearchPhase")
            .field("move_selector", &self.move_selector)
            .field("acceptor", &self.acceptor)
            .field("forager", &self.forager)
            .field("step_limit", &self.step_limit)
            .field("moves_per_step", &self.moves_per_step)
            .finish()
    }
}

impl<S, MS, A, Fo> Phase<S> for LocalSearchPhase<S, MS, A, Fo>
where
    S: Score,
    MS: MoveSelector<S>,
    A: Acceptor<S>,
    Fo: LocalSearchForager<S>,
{
    fn solve(&mut self, solver_scope: &mut SolverScope<S>, phase_index: usize) -> Result<(), SolverError> {
        solver_scope.set_state(SolverState::Improving);
        let mut phase_scope = PhaseScope::new(solver_scope, phase_index);
        info!(
            event = "phase_start",
            phase = "Local Search",
            phase_index = phase_index,
        );

        let draws = self.move_selector.size().min(self.moves_per_step);
        let mut last_step_score = phase_scope.calculate_score();
        self.acceptor.phase_started(&last_step_score);
        let mut candidates: Vec<EitherMove> = Vec::new();
        let mut last_progress = Instant::now();
        let mut last_progress_moves = 0u64;

        'steps: while draws > 0 {
            if phase_scope.should_terminate() {
                break;
            }
            if self.step_limit.is_some_and(|limit| phase_scope.step_count() >= limit) {
                break;
            }

            self.acceptor.step_started();
            self.forager.step_started(&last_step_score);
            candidates.clear();

            for _ in 0..draws {
                if phase_scope.should_terminate() {
                    break 'steps;
                }
                let candidate = {
                    let (director, rng) = phase_scope.solver_scope_mut().director_and_rng();
                    self.move_selector.random_move(director.working_solution(), rng)
                };
                let Some(m) = candidate else {
                    break;
                };
                if !m.is_doable(phase_scope.score_director()) {
                    continue;
                }

                let director = phase_scope.score_director_mut();
                let undo = m.do_move(director)?;
                let move_score = director.calculate_score();
                undo.undo(director)?;

                let moved = Move::<S>::entities(&m);
                let accepted = self.acceptor.is_accepted(&last_step_score, &move_score, &moved);
                phase_scope.record_move(accepted);
                trace!(event = "move", candidate = ?m, score = %move_score, accepted = accepted);

                if accepted {
                    self.forager.add_move_index(candidates.len(), move_score);
                }
                candidates.push(m);
                if self.forager.is_quit_early() {
                    break;
                }
            }

            let Some((index, step_score)) = self.forager.pick_move_index() else {
                // nothing accepted among the drawn candidates
                break;
            };
            let m = candidates.swap_remove(index);
            m.do_move(phase_scope.score_director_mut())?;
            let moved = Move::<S>::entities(&m);
            self.acceptor.step_ended(&step_score, &moved);
            last_step_score = step_score;

            let step = phase_scope.increment_step_count();
            debug!(
                event = "step",
                step = step,
                entity = ?moved,
                score = %step_score,
                accepted = true,
            );
            phase_scope.update_best_solution();
            phase_scope.solver_scope_mut().assert_step()?;

            if last_progress.elapsed() >= PROGRESS_INTERVAL {
                let moves = phase_scope.moves_evaluated();
                debug!(
                    event = "progress",
                    steps = phase_scope.step_count(),
                    speed = ((moves - last_progress_moves) as f64 / last_progress.elapsed().as_secs_f64()) as u64,
                    score = phase_scope.best_score_label(),
                );
                last_progress = Instant::now();
                last_progress_moves = moves;
            }
        }

        self.acceptor.phase_ended();
        phase_scope.solver_scope_mut().assert_phase()?;

        info!(
            event = "phase_end",
            phase = "Local Search",
            phase_index = phase_index,
            duration_ms = phase_scope.elapsed().as_millis() as u64,
            steps = phase_scope.step_count(),
            speed = phase_scope.speed(),
            score = phase_scope.best_score_label(),
        );
        Ok(())
    }

    fn phase_type_name(&self) -> &'static str {
        "LocalSearch"
    }
}
