//! Union of move selectors.

use plansmith_core::{Problem, Score};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use super::MoveSelector;
use crate::heuristic::r#move::EitherMove;

/// Draws from a uniformly chosen non-empty child selector.
#[derive(Debug)]
pub struct UnionMoveSelector<S: Score> {
    selectors: Vec<Box<dyn MoveSelector<S>>>,
}

impl<S: Score> UnionMoveSelector<S> {
    pub fn new(selectors: Vec<Box<dyn MoveSelector<S>>>) -> Self {
        let selectors = selectors.into_iter().filter(|s| s.size() > 0).collect();
        Self { selectors }
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl<S: Score> MoveSelector<S> for UnionMoveSelector<S> {
    fn random_move(&self, problem: &Problem<S>, rng: &mut StdRng) -> Option<EitherMove> {
        self.selectors.choose(rng)?.random_move(problem, rng)
    }

    fn size(&self) -> usize {
        self.selectors.iter().map(|s| s.size()).sum()
    }
}
