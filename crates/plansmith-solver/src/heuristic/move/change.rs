//! ChangeMove - assigns a value to a planning variable.

use plansmith_core::{EntityRef, FieldId, Score, Value};
use plansmith_scoring::{ScoreDirector, ScoreDirectorError};
use smallvec::{smallvec, SmallVec};

use super::{Move, MoveUndo};

/// A move that assigns a value to one variable of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeMove {
    entity: EntityRef,
    field: FieldId,
    to_value: Value,
}

impl ChangeMove {
    pub fn new(entity: EntityRef, field: FieldId, to_value: Value) -> Self {
        Self {
            entity,
            field,
            to_value,
        }
    }

    pub fn entity(&self) -> EntityRef {
        self.entity
    }

    pub fn field(&self) -> FieldId {
        self.field
    }

    /// Returns the target value.
    pub fn to_value(&self) -> &Value {
        &self.to_value
    }
}

impl<S: Score> Move<S> for ChangeMove {
    fn is_doable(&self, score_director: &ScoreDirector<S>) -> bool {
        let problem = score_director.working_solution();
        if problem.is_pinned(self.entity) {
            return false;
        }
        let in_range = problem
            .domain(self.entity.class, self.field)
            .is_some_and(|domain| domain.contains(&self.to_value));
        in_range && problem.variable(self.entity, self.field) != Some(&self.to_value)
    }

    fn do_move(&self, score_director: &mut ScoreDirector<S>) -> Result<MoveUndo, ScoreDirectorError> {
        let mut undo = MoveUndo::new();
        undo.change(score_director, self.entity, self.field, self.to_value.clone())?;
        Ok(undo)
    }

    fn entities(&self) -> SmallVec<[EntityRef; 2]> {
        smallvec![self.entity]
    }
}
