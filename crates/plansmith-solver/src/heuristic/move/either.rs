//! EitherMove - a union of ChangeMove and SwapMove.
//!
//! Lets local search mix both move types without trait-object dispatch.

use plansmith_core::{EntityRef, Score};
use plansmith_scoring::{ScoreDirector, ScoreDirectorError};
use smallvec::SmallVec;

use super::{ChangeMove, Move, MoveUndo, SwapMove};

#[derive(Debug, Clone, PartialEq)]
pub enum EitherMove {
    Change(ChangeMove),
    Swap(SwapMove),
}

impl<S: Score> Move<S> for EitherMove {
    fn is_doable(&self, score_director: &ScoreDirector<S>) -> bool {
        match self {
            Self::Change(m) => Move::<S>::is_doable(m, score_director),
            Self::Swap(m) => Move::<S>::is_doable(m, score_director),
        }
    }

    fn do_move(&self, score_director: &mut ScoreDirector<S>) -> Result<MoveUndo, ScoreDirectorError> {
        match self {
            Self::Change(m) => m.do_move(score_director),
            Self::Swap(m) => m.do_move(score_director),
        }
    }

    fn entities(&self) -> SmallVec<[EntityRef; 2]> {
        match self {
            Self::Change(m) => Move::<S>::entities(m),
            Self::Swap(m) => Move::<S>::entities(m),
        }
    }
}

impl From<ChangeMove> for EitherMove {
    fn from(m: ChangeMove) -> Self {
        Self::Change(m)
    }
}

impl From<SwapMove> for EitherMove {
    fn from(m: SwapMove) -> Self {
        Self::Swap(m)
    }
}
