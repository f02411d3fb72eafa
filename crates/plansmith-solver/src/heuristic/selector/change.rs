//! Change move selector.

use plansmith_core::{EntityRef, FieldId, Problem, Score, Value};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

use super::{movable_entities, MoveSelector};
use crate::heuristic::r#move::{ChangeMove, EitherMove};

/// Proposes a random value for a random movable variable.
#[derive(Debug, Clone)]
pub struct ChangeMoveSelector {
    targets: Vec<(EntityRef, FieldId)>,
    size: usize,
}

impl ChangeMoveSelector {
    /// Selects over every movable entity, or only those of `entity_class`.
    pub fn new<S: Score>(problem: &Problem<S>, entity_class: Option<usize>) -> Self {
        let mut targets = Vec::new();
        let mut size: usize = 0;
        for (entity, fields) in movable_entities(problem, entity_class) {
            for field in fields {
                if let Some(domain) = problem.domain(entity.class, field) {
                    size = size
                        .saturating_add(domain.len())
                        .saturating_add(usize::from(domain.allows_unassigned()));
                    targets.push((entity, field));
                }
            }
        }
        Self { targets, size }
    }

    pub fn targets(&self) -> &[(EntityRef, FieldId)] {
        &self.targets
    }
}

impl<S: Score> MoveSelector<S> for ChangeMoveSelector {
    fn random_move(&self, problem: &Problem<S>, rng: &mut StdRng) -> Option<EitherMove> {
        let &(entity, field) = self.targets.choose(rng)?;
        let domain = problem.domain(entity.class, field)?;
        let choices = domain.len().saturating_add(usize::from(domain.allows_unassigned()));
        if choices == 0 {
            return None;
        }
        let value = domain.get(rng.random_range(0..choices)).unwrap_or(Value::None);
        Some(ChangeMove::new(entity, field, value).into())
    }

    fn size(&self) -> usize {
        self.size
    }
}
