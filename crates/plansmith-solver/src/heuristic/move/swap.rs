//! SwapMove - exchanges variable values between two entities.

use plansmith_core::{EntityRef, FieldId, Score};
use plansmith_scoring::{ScoreDirector, ScoreDirectorError};
use smallvec::{smallvec, SmallVec};

use super::{Move, MoveUndo};

/// A move that swaps the given variables between two entities of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapMove {
    left: EntityRef,
    right: EntityRef,
    fields: SmallVec<[FieldId; 2]>,
}

impl SwapMove {
    /// Both entities must belong to the same class.
    pub fn new(left: EntityRef, right: EntityRef, fields: impl IntoIterator<Item = FieldId>) -> Self {
        Self {
            left,
            right,
            fields: fields.into_iter().collect(),
        }
    }

    pub fn left(&self) -> EntityRef {
        self.left
    }

    pub fn right(&self) -> EntityRef {
        self.right
    }

    pub fn fields(&self) -> &[FieldId] {
        &self.fields
    }
}

impl<S: Score> Move<S> for SwapMove {
    fn is_doable(&self, score_director: &ScoreDirector<S>) -> bool {
        if self.left == self.right || self.left.class != self.right.class {
            return false;
        }
        let problem = score_director.working_solution();
        if problem.is_pinned(self.left) || problem.is_pinned(self.right) {
            return false;
        }

        let mut differs = false;
        for &field in &self.fields {
            let (Some(left), Some(right), Some(domain)) = (
                problem.variable(self.left, field),
                problem.variable(self.right, field),
                problem.domain(self.left.class, field),
            ) else {
                return false;
            };
            // an unassigned value can only move where unassigned is allowed
            if !domain.contains(left) || !domain.contains(right) {
                return false;
            }
            differs |= left != right;
        }
        differs
    }

    fn do_move(&self, score_director: &mut ScoreDirector<S>) -> Result<MoveUndo, ScoreDirectorError> {
        let mut undo = MoveUndo::new();
        for &field in &self.fields {
            let problem = score_director.working_solution();
            let (Some(left), Some(right)) = (
                problem.variable(self.left, field).cloned(),
                problem.variable(self.right, field).cloned(),
            ) else {
                continue;
            };
            if left == right {
                continue;
            }
            let result = undo
                .change(score_director, self.left, field, right)
                .and_then(|()| undo.change(score_director, self.right, field, left));
            if let Err(err) = result {
                undo.undo(score_director)?;
                return Err(err);
            }
        }
        Ok(undo)
    }

    fn entities(&self) -> SmallVec<[EntityRef; 2]> {
        smallvec![self.left, self.right]
    }
}
