//! Move trait definition.

use std::fmt::Debug;

use plansmith_core::{EntityRef, FieldId, Score, Value};
use plansmith_scoring::{ScoreDirector, ScoreDirectorError};
use smallvec::SmallVec;

/// A move that modifies one or more planning variables.
///
/// Moves are small value types. Executing one returns a [`MoveUndo`] that
/// puts every touched variable back, which is how local search evaluates a
/// candidate without keeping it.
pub trait Move<S: Score>: Send + Sync + Debug {
    /// Returns true if this move can be executed in the current state.
    ///
    /// A move is not doable if it targets a pinned entity, would assign a
    /// value outside the variable's range, or changes nothing.
    fn is_doable(&self, score_director: &ScoreDirector<S>) -> bool;

    /// Executes this move through the score director.
    ///
    /// On error nothing stays changed.
    fn do_move(&self, score_director: &mut ScoreDirector<S>) -> Result<MoveUndo, ScoreDirectorError>;

    /// Returns the entities this move touches.
    fn entities(&self) -> SmallVec<[EntityRef; 2]>;
}

/// Previous values of the variables a move changed, in change order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MoveUndo {
    changes: SmallVec<[(EntityRef, FieldId, Value); 4]>,
}

impl MoveUndo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes one variable and records what it held before.
    pub(crate) fn change<S: Score>(
        &mut self,
        score_director: &mut ScoreDirector<S>,
        entity: EntityRef,
        field: FieldId,
        value: Value,
    ) -> Result<(), ScoreDirectorError> {
        let previous = score_director.change_variable(entity, field, value)?;
        self.changes.push((entity, field, previous));
        Ok(())
    }

    /// Reverts every recorded change, last first.
    pub fn undo<S: Score>(self, score_director: &mut ScoreDirector<S>) -> Result<(), ScoreDirectorError> {
        for (entity, field, previous) in self.changes.into_iter().rev() {
            score_director.undo_change(entity, field, previous)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
