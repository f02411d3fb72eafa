//! Construction heuristic.
//!
//! Every unassigned planning variable of a movable entity becomes one
//! [`Placement`]. Its candidates are the variable's values, produced one at
//! a time from the domain, so a huge integer range costs nothing up front.
//! A forager picks which candidate to keep.

mod forager;
mod phase;


use plansmith_core::{EntityRef, FieldId, Problem, Score, Value};
use plansmith_scoring::{ScoreDirector, ScoreDirectorError};

use crate::heuristic::r#move::{ChangeMove, Move};

pub use forager::{BestFitForager, ConstructionForager, FirstFitForager};
pub use phase::ConstructionHeuristicPhase;

/// Candidate assignments for one unassigned variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub entity: EntityRef,
    pub field: FieldId,
    len: usize,
}

impl Placement {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The candidate at `index`: the domain values in order, then
    /// unassigned for a nullable variable.
    pub fn move_at<S: Score>(&self, problem: &Problem<S>, index: usize) -> Option<ChangeMove> {
        if index >= self.len {
            return None;
        }
        let domain = problem.domain(self.entity.class, self.field)?;
        let value = match domain.get(index) {
            Some(value) => value,
            None if domain.allows_unassigned() => Value::None,
            None => return None,
        };
        Some(ChangeMove::new(self.entity, self.field, value))
    }
}

/// One placement per unassigned variable, in entity order.
///
/// Nullable variables also get the option of staying unassigned.
pub fn placements<S: Score>(problem: &Problem<S>) -> Vec<Placement> {
    let descriptor = problem.descriptor();
    let mut result = Vec::new();
    for entity in problem.entity_refs() {
        if problem.is_pinned(entity) {
            continue;
        }
        let Some(class) = descriptor.entity_class(entity.class) else {
            continue;
        };
        for field in class.variables() {
            if problem.variable(entity, field).map_or(true, |v| !v.is_none()) {
                continue;
            }
            let Some(domain) = problem.domain(entity.class, field) else {
                continue;
            };
            let len = domain.len().saturating_add(usize::from(domain.allows_unassigned()));
            result.push(Placement { entity, field, len });
        }
    }
    result
}

/// Score the working solution would have after `m`, leaving it unchanged.
///
/// A move that keeps the current value scores as the solution stands.
/// `None` when the move cannot be applied at all.
pub(crate) fn evaluate<S: Score>(
    m: &ChangeMove,
    score_director: &mut ScoreDirector<S>,
) -> Result<Option<S>, ScoreDirectorError> {
    if m.is_doable(score_director) {
        let undo = m.do_move(score_director)?;
        let score = score_director.calculate_score();
        undo.undo(score_director)?;
        return Ok(Some(score));
    }
    let unchanged = score_director.working_solution().variable(m.entity(), m.field()) == Some(m.to_value());
    Ok(unchanged.then(|| score_director.calculate_score()))
}
