//! Swap move selector.

use plansmith_core::{EntityRef, FieldId, Problem, Score};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use smallvec::SmallVec;

use super::{movable_entities, MoveSelector};
use crate::heuristic::r#move::{EitherMove, SwapMove};

#[derive(Debug, Clone)]
struct SwapGroup {
    entities: Vec<EntityRef>,
    fields: SmallVec<[FieldId; 2]>,
}

/// Proposes swapping all planning variables of two random entities of the
/// same class.
#[derive(Debug, Clone)]
pub struct SwapMoveSelector {
    groups: Vec<SwapGroup>,
    size: usize,
}

impl SwapMoveSelector {
    pub fn new<S: Score>(problem: &Problem<S>, entity_class: Option<usize>) -> Self {
        let mut groups: Vec<(usize, SwapGroup)> = Vec::new();
        for (entity, fields) in movable_entities(problem, entity_class) {
            match groups.iter_mut().find(|(class, _)| *class == entity.class) {
                Some((_, group)) => group.entities.push(entity),
                None => groups.push((
                    entity.class,
                    SwapGroup {
                        entities: vec![entity],
                        fields: fields.into_iter().collect(),
                    },
                )),
            }
        }
        let groups: Vec<SwapGroup> = groups
            .into_iter()
            .map(|(_, group)| group)
            .filter(|group| group.entities.len() > 1)
            .collect();
        let size = groups
            .iter()
            .map(|g| g.entities.len() * (g.entities.len() - 1) / 2)
            .sum();
        Self { groups, size }
    }
}

impl<S: Score> MoveSelector<S> for SwapMoveSelector {
    fn random_move(&self, _problem: &Problem<S>, rng: &mut StdRng) -> Option<EitherMove> {
        let group = self.groups.choose(rng)?;
        let n = group.entities.len();
        let left = rng.random_range(0..n);
        // uniform over the other n - 1 entities
        let right = (left + rng.random_range(1..n)) % n;
        Some(
            SwapMove::new(
                group.entities[left],
                group.entities[right],
                group.fields.iter().copied(),
            )
            .into(),
        )
    }

    fn size(&self) -> usize {
        self.size
    }
}
