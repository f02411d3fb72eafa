//! Construction heuristic phase implementation.

use std::fmt::Debug;

use plansmith_core::Score;
use tracing::{debug, info};

use super::{placements, ConstructionForager};
use crate::error::SolverError;
use crate::heuristic::r#move::Move;
use crate::phase::Phase;
use crate::scope::{PhaseScope, SolverScope};
use crate::solver::SolverState;

/// Construction heuristic phase that builds an initial solution.
///
/// Visits every unassigned planning variable once, in entity order, and
/// assigns the value the forager picks. Variables that are already assigned
/// and pinned entities are left alone. Termination is checked before every
/// placement and by the forager before every candidate, so an interrupted
/// construction still leaves a consistent partial solution.
#[derive(Debug)]
pub struct ConstructionHeuristicPhase<Fo> {
    forager: Fo,
}

impl<Fo> ConstructionHeuristicPhase<Fo> {
    pub fn new(forager: Fo) -> Self {
        Self { forager }
    }
}

impl<S, Fo> Phase<S> for ConstructionHeuristicPhase<Fo>
where
    S: Score,
    Fo: ConstructionForager<S>,
{
    fn solve(&mut self, solver_scope: &mut SolverScope<S>, phase_index: usize) -> Result<(), SolverError> {
        solver_scope.set_state(SolverState::Constructing);
        let mut phase_scope = PhaseScope::new(solver_scope, phase_index);
        info!(
            event = "phase_start",
            phase = "Construction Heuristic",
            phase_index = phase_index,
        );

        let placements = placements(phase_scope.score_director().working_solution());
        for placement in placements {
            if phase_scope.should_terminate() {
                break;
            }
            let Some(idx) = self.forager.pick_move_index(&placement, &mut phase_scope)? else {
                continue;
            };
            let Some(m) = placement.move_at(phase_scope.score_director().working_solution(), idx) else {
                continue;
            };
            if m.is_doable(phase_scope.score_director()) {
                m.do_move(phase_scope.score_director_mut())?;
            }
            let step = phase_scope.increment_step_count();
            let score = phase_scope.calculate_score();
            debug!(
                event = "step",
                step = step,
                entity = ?placement.entity,
                score = %score,
                accepted = true,
            );
            phase_scope.solver_scope_mut().assert_step()?;
        }

        phase_scope.update_best_solution();
        phase_scope.solver_scope_mut().assert_phase()?;

        info!(
            event = "phase_end",
            phase = "Construction Heuristic",
            phase_index = phase_index,
            duration_ms = phase_scope.elapsed().as_millis() as u64,
            steps = phase_scope.step_count(),
            speed = phase_scope.speed(),
            score = phase_scope.best_score_label(),
        );
        Ok(())
    }

    fn phase_type_name(&self) -> &'static str {
        "ConstructionHeuristic"
    }
}
