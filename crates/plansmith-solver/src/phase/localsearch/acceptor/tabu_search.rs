//! Tabu search acceptor.

use std::collections::VecDeque;

use plansmith_core::{EntityRef, Score};

use super::Acceptor;

/// Tabu search acceptor - forbids moving recently moved entities.
///
/// The entities changed by the last steps are tabu, up to `tabu_size` of
/// them. Any move that leaves them alone is accepted, worsening ones
/// included, so the forager should look at many moves per step and keep the
/// best. With aspiration, a tabu move that beats the best score of the phase
/// is still accepted.
#[derive(Debug, Clone)]
pub struct TabuSearchAcceptor<S: Score> {
    tabu_size: usize,
    tabu_list: VecDeque<EntityRef>,
    aspiration_enabled: bool,
    best_score: Option<S>,
}

impl<S: Score> TabuSearchAcceptor<S> {
    pub fn new(tabu_size: usize) -> Self {
        Self {
            tabu_size,
            tabu_list: VecDeque::with_capacity(tabu_size),
            aspiration_enabled: true,
            best_score: None,
        }
    }

    /// Without aspiration, tabu moves are never accepted.
    pub fn without_aspiration(tabu_size: usize) -> Self {
        Self {
            aspiration_enabled: false,
            ..Self::new(tabu_size)
        }
    }

    pub fn is_tabu(&self, entity: EntityRef) -> bool {
        self.tabu_list.contains(&entity)
    }
}

impl<S: Score> Default for TabuSearchAcceptor<S> {
    fn default() -> Self {
        Self::new(7)
    }
}

impl<S: Score> Acceptor<S> for TabuSearchAcceptor<S> {
    fn is_accepted(&mut self, _last_step_score: &S, move_score: &S, moved: &[EntityRef]) -> bool {
        if !moved.iter().any(|&e| self.is_tabu(e)) {
            return true;
        }
        self.aspiration_enabled && self.best_score.as_ref().is_some_and(|best| move_score > best)
    }

    fn phase_started(&mut self, initial_score: &S) {
        self.tabu_list.clear();
        self.best_score = Some(*initial_score);
    }

    fn phase_ended(&mut self) {
        self.tabu_list.clear();
        self.best_score = None;
    }

    fn step_ended(&mut self, step_score: &S, moved: &[EntityRef]) {
        if self.best_score.as_ref().map_or(true, |best| step_score > best) {
            self.best_score = Some(*step_score);
        }
        if self.tabu_size == 0 {
            return;
        }
        for &entity in moved {
            self.tabu_list.retain(|&e| e != entity);
            if self.tabu_list.len() >= self.tabu_size {
                self.tabu_list.pop_front();
            }
            self.tabu_list.push_back(entity);
        }
    }
}
