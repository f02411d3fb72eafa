//! Foragers for local search move selection.
//!
//! Foragers collect the accepted candidates of a step and pick the one the
//! step applies. They work on indices into the step's candidate list, so
//! moves are never cloned.

use std::fmt::Debug;

use plansmith_config::PickEarlyType;
use plansmith_core::Score;

/// Trait for collecting and selecting moves in local search.
pub trait LocalSearchForager<S: Score>: Send + Debug {
    /// Called at the start of each step to reset state.
    fn step_started(&mut self, last_step_score: &S);

    /// Adds an accepted candidate.
    fn add_move_index(&mut self, index: usize, score: S);

    /// Returns true once no more candidates need to be evaluated.
    fn is_quit_early(&self) -> bool;

    /// Picks the candidate to apply. None if nothing was accepted.
    fn pick_move_index(&mut self) -> Option<(usize, S)>;
}

impl<S: Score, F: LocalSearchForager<S> + ?Sized> LocalSearchForager<S> for Box<F> {
    fn step_started(&mut self, last_step_score: &S) {
        (**self).step_started(last_step_score);
    }

    fn add_move_index(&mut self, index: usize, score: S) {
        (**self).add_move_index(index, score);
    }

    fn is_quit_early(&self) -> bool {
        (**self).is_quit_early()
    }

    fn pick_move_index(&mut self) -> Option<(usize, S)> {
        (**self).pick_move_index()
    }
}

/// Collects up to `accepted_count_limit` accepted moves and picks the best.
///
/// Ties go to the candidate accepted first. With
/// [`PickEarlyType::FirstLastStepScoreImproving`] the step ends on the first
/// accepted move that beats the last step score.
#[derive(Debug, Clone)]
pub struct AcceptedCountForager<S: Score> {
    accepted_count_limit: usize,
    pick_early_type: PickEarlyType,
    last_step_score: Option<S>,
    accepted_count: usize,
    best: Option<(usize, S)>,
    picked_early: bool,
}

impl<S: Score> AcceptedCountForager<S> {
    /// A limit of zero is treated as one.
    pub fn new(accepted_count_limit: usize) -> Self {
        Self {
            accepted_count_limit: accepted_count_limit.max(1),
            pick_early_type: PickEarlyType::Never,
            last_step_score: None,
            accepted_count: 0,
            best: None,
            picked_early: false,
        }
    }

    pub fn with_pick_early_type(mut self, pick_early_type: PickEarlyType) -> Self {
        self.pick_early_type = pick_early_type;
        self
    }

    pub fn accepted_count_limit(&self) -> usize {
        self.accepted_count_limit
    }
}

impl<S: Score> LocalSearchForager<S> for AcceptedCountForager<S> {
    fn step_started(&mut self, last_step_score: &S) {
        self.last_step_score = Some(*last_step_score);
        self.accepted_count = 0;
        self.best = None;
        self.picked_early = false;
    }

    fn add_move_index(&mut self, index: usize, score: S) {
        self.accepted_count += 1;
        if self.pick_early_type == PickEarlyType::FirstLastStepScoreImproving
            && self.last_step_score.is_some_and(|last| score > last)
        {
            self.best = Some((index, score));
            self.picked_early = true;
            return;
        }
        if self.best.as_ref().map_or(true, |(_, best)| score > *best) {
            self.best = Some((index, score));
        }
    }

    fn is_quit_early(&self) -> bool {
        self.picked_early || self.accepted_count >= self.accepted_count_limit
    }

    fn pick_move_index(&mut self) -> Option<(usize, S)> {
        self.best.take()
    }
}

/// Takes the first accepted move.
#[derive(Debug, Clone, Default)]
pub struct FirstAcceptedForager<S: Score> {
    accepted: Option<(usize, S)>,
}

impl<S: Score> FirstAcceptedForager<S> {
    pub fn new() -> Self {
        Self { accepted: None }
    }
}

impl<S: Score> LocalSearchForager<S> for FirstAcceptedForager<S> {
    fn step_started(&mut self, _last_step_score: &S) {
        self.accepted = None;
    }

    fn add_move_index(&mut self, index: usize, score: S) {
        if self.accepted.is_none() {
            self.accepted = Some((index, score));
        }
    }

    fn is_quit_early(&self) -> bool {
        self.accepted.is_some()
    }

    fn pick_move_index(&mut self) -> Option<(usize, S)> {
        self.accepted.take()
    }
}
