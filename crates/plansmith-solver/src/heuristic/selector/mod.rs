//! Selectors that propose candidate moves.
//!
//! Selectors are built once per solve from the working problem. Pinned
//! entities never change, so they are filtered out at build time and no
//! selector can ever propose a move that targets one.

mod change;
mod swap;
mod union;

#[cfg(test)]
mod tests;

use std::fmt::Debug;

use plansmith_core::{EntityRef, FieldId, Problem, Score};
use rand::rngs::StdRng;

use crate::heuristic::r#move::EitherMove;

pub use change::ChangeMoveSelector;
pub use swap::SwapMoveSelector;
pub use union::UnionMoveSelector;

/// Proposes random moves for local search.
pub trait MoveSelector<S: Score>: Send + Debug {
    /// Draws one candidate move. `None` when there is nothing to move.
    fn random_move(&self, problem: &Problem<S>, rng: &mut StdRng) -> Option<EitherMove>;

    /// Number of distinct moves this selector can propose.
    fn size(&self) -> usize;
}

impl<S: Score, M: MoveSelector<S> + ?Sized> MoveSelector<S> for Box<M> {
    fn random_move(&self, problem: &Problem<S>, rng: &mut StdRng) -> Option<EitherMove> {
        (**self).random_move(problem, rng)
    }

    fn size(&self) -> usize {
        (**self).size()
    }
}

/// Entities that are not pinned, with the planning variables of their class.
pub(crate) fn movable_entities<S: Score>(
    problem: &Problem<S>,
    entity_class: Option<usize>,
) -> impl Iterator<Item = (EntityRef, Vec<FieldId>)> + '_ {
    let descriptor = problem.descriptor();
    problem
        .entity_refs()
        .filter(move |e| entity_class.map_or(true, |class| class == e.class))
        .filter(|&e| !problem.is_pinned(e))
        .filter_map(move |e| {
            let fields: Vec<FieldId> = descriptor.entity_class(e.class)?.variables().collect();
            (!fields.is_empty()).then_some((e, fields))
        })
}
