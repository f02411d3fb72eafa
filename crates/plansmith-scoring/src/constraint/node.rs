//! Incremental evaluation of one constraint.
//!
//! The node keeps, per pipeline level, the set of partial tuples currently
//! formed, indexed by element and by the key of the next join. Join and
//! existence sources are kept in hash indexes keyed by their equality
//! joiners. Complete tuples live in `candidates` along with how many
//! elements satisfy each existence stage.
//!
//! Changing an element is a [`retract`](ConstraintNode::retract) with the
//! old values followed by an [`insert`](ConstraintNode::insert) with the new
//! ones. Each only touches tuples containing that element or candidates
//! sharing its existence key.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use plansmith_core::{ElementRef, Problem, Row, Score};
use smallvec::smallvec;

use crate::stream::joiner::{left_key, residual_match, right_key, IndexKey};
use crate::tuple::{Tuple, TupleView};

use super::pipeline::{Level, Pipeline, Source};
use super::terminal::TerminalState;
use super::Constraint;

#[derive(Default)]
struct LevelMemory {
    /// Tuple to its left key for the next join.
    tuples: HashMap<Tuple, IndexKey>,
    by_element: HashMap<ElementRef, HashSet<Tuple>>,
    by_next_key: HashMap<IndexKey, HashSet<Tuple>>,
}

#[derive(Default)]
struct RightIndex {
    buckets: HashMap<IndexKey, HashSet<ElementRef>>,
    keys: HashMap<ElementRef, IndexKey>,
}

impl RightIndex {
    fn insert(&mut self, element: ElementRef, key: IndexKey) {
        self.buckets.entry(key.clone()).or_default().insert(element);
        self.keys.insert(element, key);
    }

    fn remove(&mut self, element: ElementRef) -> Option<IndexKey> {
        let key = self.keys.remove(&element)?;
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.remove(&element);
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
        Some(key)
    }

    fn bucket(&self, key: &IndexKey) -> Vec<ElementRef> {
        self.buckets
            .get(key)
            .map(|b| b.iter().copied().collect())
            .unwrap_or_default()
    }
}

struct Candidate {
    exists_keys: Vec<IndexKey>,
    counts: Vec<usize>,
    alive: bool,
}

pub(crate) struct ConstraintNode<S: Score> {
    constraint: Arc<Constraint<S>>,
    levels: Vec<LevelMemory>,
    /// Right-hand index per level; slot 0 is never used.
    join_indexes: Vec<RightIndex>,
    exists_indexes: Vec<RightIndex>,
    candidates: HashMap<Tuple, Candidate>,
    /// Per existence stage: candidates by their left key.
    candidate_index: Vec<HashMap<IndexKey, HashSet<Tuple>>>,
    terminal: Box<dyn TerminalState<S>>,
}

fn remove_from<K, V>(map: &mut HashMap<K, HashSet<V>>, key: &K, value: &V)
where
    K: std::hash::Hash + Eq,
    V: std::hash::Hash + Eq,
{
    if let Some(set) = map.get_mut(key) {
        set.remove(value);
        if set.is_empty() {
            map.remove(key);
        }
    }
}

/// Appends `element` to `prefix` when the level's joiners and filters allow it.
fn extend<S: Score>(
    problem: &Problem<S>,
    level: &Level,
    prefix: &Tuple,
    element: ElementRef,
    row: &Row<'_>,
) -> Option<Tuple> {
    if !residual_match(&level.joiners, &TupleView::new(problem, prefix), row) {
        return None;
    }
    let mut tuple = prefix.clone();
    tuple.push(element);
    let accepted = level.accepts(&TupleView::new(problem, &tuple));
    accepted.then_some(tuple)
}

impl<S: Score> ConstraintNode<S> {
    pub(crate) fn new(constraint: Arc<Constraint<S>>) -> Self {
        let pipeline = &constraint.pipeline;
        let levels = pipeline.levels.len();
        let exists = pipeline.exists.len();
        let terminal = constraint.create_state();
        Self {
            levels: (0..levels).map(|_| LevelMemory::default()).collect(),
            join_indexes: (0..levels).map(|_| RightIndex::default()).collect(),
            exists_indexes: (0..exists).map(|_| RightIndex::default()).collect(),
            candidates: HashMap::new(),
            candidate_index: (0..exists).map(|_| HashMap::new()).collect(),
            terminal,
            constraint,
        }
    }

    pub(crate) fn constraint(&self) -> &Arc<Constraint<S>> {
        &self.constraint
    }

    pub(crate) fn score(&self) -> S {
        self.terminal.score()
    }

    pub(crate) fn terminal(&self) -> &dyn TerminalState<S> {
        self.terminal.as_ref()
    }

    /// True when changes to entities of `class` can affect this constraint.
    pub(crate) fn reads_entity_class(&self, class: usize) -> bool {
        self.constraint
            .pipeline
            .sources()
            .any(|s| matches!(s, Source::Entities { class: c, .. } if c == class))
    }

    /// Discards all memory and rebuilds it from `problem`.
    pub(crate) fn initialize(&mut self, problem: &Problem<S>) -> S {
        let constraint = Arc::clone(&self.constraint);
        *self = Self::new(Arc::clone(&constraint));

        let mut sources: Vec<Source> = Vec::new();
        for source in constraint.pipeline.sources() {
            let class_seen = sources.iter().any(|s| match (s, source) {
                (Source::Facts(a), Source::Facts(b)) => *a == b,
                (Source::Entities { class: a, .. }, Source::Entities { class: b, .. }) => *a == b,
                _ => false,
            });
            if !class_seen {
                sources.push(source);
            }
        }
        for source in sources {
            let elements: Vec<ElementRef> = source.all_elements(problem).collect();
            for element in elements {
                self.insert(problem, element);
            }
        }
        self.score()
    }

    /// Adds `element` in its current state. Returns the score delta.
    pub(crate) fn insert(&mut self, problem: &Problem<S>, element: ElementRef) -> S {
        let constraint = Arc::clone(&self.constraint);
        let pipeline = &constraint.pipeline;
        let Some(row) = problem.row(element) else {
            return S::zero();
        };
        let mut delta = S::zero();

        for (s, stage) in pipeline.exists.iter().enumerate() {
            if !stage.source.admits(problem, element) {
                continue;
            }
            let key = right_key(&stage.joiners, &row);
            let matched: Vec<Tuple> = self.candidate_index[s]
                .get(&key)
                .map(|set| {
                    set.iter()
                        .filter(|t| {
                            residual_match(&stage.joiners, &TupleView::new(problem, t), &row)
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            self.exists_indexes[s].insert(element, key);
            for tuple in matched {
                if let Some(candidate) = self.candidates.get_mut(&tuple) {
                    candidate.counts[s] += 1;
                }
                delta = delta + self.refresh(problem, pipeline, &tuple);
            }
        }

        for (k, level) in pipeline.levels.iter().enumerate().skip(1) {
            if level.source.admits(problem, element) {
                self.join_indexes[k].insert(element, right_key(&level.joiners, &row));
            }
        }

        for (k, level) in pipeline.levels.iter().enumerate() {
            if !level.source.admits(problem, element) {
                continue;
            }
            if k == 0 {
                let tuple: Tuple = smallvec![element];
                if level.accepts(&TupleView::new(problem, &tuple)) {
                    self.add_tuple(problem, pipeline, 0, tuple, &mut delta);
                }
                continue;
            }
            let Some(key) = self.join_indexes[k].keys.get(&element).cloned() else {
                continue;
            };
            let prefixes: Vec<Tuple> = self.levels[k - 1]
                .by_next_key
                .get(&key)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            for prefix in prefixes {
                if let Some(tuple) = extend(problem, level, &prefix, element, &row) {
                    self.add_tuple(problem, pipeline, k, tuple, &mut delta);
                }
            }
        }
        delta
    }

    /// Removes `element` in the state it was inserted with. Returns the score delta.
    pub(crate) fn retract(&mut self, problem: &Problem<S>, element: ElementRef) -> S {
        let constraint = Arc::clone(&self.constraint);
        let pipeline = &constraint.pipeline;
        let mut delta = S::zero();

        for k in 0..self.levels.len() {
            let Some(tuples) = self.levels[k].by_element.remove(&element) else {
                continue;
            };
            for tuple in tuples {
                delta = delta + self.remove_tuple(k, &tuple, element);
            }
        }

        for index in &mut self.join_indexes {
            index.remove(element);
        }

        let row = problem.row(element);
        for (s, stage) in pipeline.exists.iter().enumerate() {
            let Some(key) = self.exists_indexes[s].remove(element) else {
                continue;
            };
            let Some(row) = row else {
                continue;
            };
            let matched: Vec<Tuple> = self.candidate_index[s]
                .get(&key)
                .map(|set| {
                    set.iter()
                        .filter(|t| {
                            residual_match(&stage.joiners, &TupleView::new(problem, t), &row)
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            for tuple in matched {
                if let Some(candidate) = self.candidates.get_mut(&tuple) {
                    candidate.counts[s] = candidate.counts[s].saturating_sub(1);
                }
                delta = delta + self.refresh(problem, pipeline, &tuple);
            }
        }
        delta
    }

    fn add_tuple(
        &mut self,
        problem: &Problem<S>,
        pipeline: &Pipeline,
        k: usize,
        tuple: Tuple,
        delta: &mut S,
    ) {
        if self.levels[k].tuples.contains_key(&tuple) {
            return;
        }
        let last = k + 1 == pipeline.levels.len();
        let next_key = if last {
            IndexKey::new()
        } else {
            left_key(
                &pipeline.levels[k + 1].joiners,
                &TupleView::new(problem, &tuple),
            )
        };

        let memory = &mut self.levels[k];
        for &element in &tuple {
            memory
                .by_element
                .entry(element)
                .or_default()
                .insert(tuple.clone());
        }
        if !last {
            memory
                .by_next_key
                .entry(next_key.clone())
                .or_default()
                .insert(tuple.clone());
        }
        memory.tuples.insert(tuple.clone(), next_key.clone());

        if last {
            *delta = *delta + self.create_candidate(problem, pipeline, tuple);
            return;
        }

        let next = &pipeline.levels[k + 1];
        for right in self.join_indexes[k + 1].bucket(&next_key) {
            let Some(row) = problem.row(right) else {
                continue;
            };
            if let Some(extended) = extend(problem, next, &tuple, right, &row) {
                self.add_tuple(problem, pipeline, k + 1, extended, delta);
            }
        }
    }

    fn create_candidate(&mut self, problem: &Problem<S>, pipeline: &Pipeline, tuple: Tuple) -> S {
        let view = TupleView::new(problem, &tuple);
        let mut exists_keys = Vec::with_capacity(pipeline.exists.len());
        let mut counts = Vec::with_capacity(pipeline.exists.len());
        for (s, stage) in pipeline.exists.iter().enumerate() {
            let key = left_key(&stage.joiners, &view);
            let count = self.exists_indexes[s]
                .bucket(&key)
                .into_iter()
                .filter(|&e| {
                    problem
                        .row(e)
                        .is_some_and(|row| residual_match(&stage.joiners, &view, &row))
                })
                .count();
            self.candidate_index[s]
                .entry(key.clone())
                .or_default()
                .insert(tuple.clone());
            exists_keys.push(key);
            counts.push(count);
        }

        let alive = pipeline.is_alive(&counts);
        let delta = if alive {
            self.terminal.insert(&tuple, &view)
        } else {
            S::zero()
        };
        drop(view);
        self.candidates.insert(
            tuple,
            Candidate {
                exists_keys,
                counts,
                alive,
            },
        );
        delta
    }

    /// Re-derives the alive flag of a candidate after its counts changed.
    fn refresh(&mut self, problem: &Problem<S>, pipeline: &Pipeline, tuple: &Tuple) -> S {
        let Some(candidate) = self.candidates.get_mut(tuple) else {
            return S::zero();
        };
        let alive = pipeline.is_alive(&candidate.counts);
        if alive == candidate.alive {
            return S::zero();
        }
        candidate.alive = alive;
        if alive {
            self.terminal.insert(tuple, &TupleView::new(problem, tuple))
        } else {
            self.terminal.retract(tuple)
        }
    }

    fn remove_tuple(&mut self, k: usize, tuple: &Tuple, removed: ElementRef) -> S {
        let memory = &mut self.levels[k];
        let Some(next_key) = memory.tuples.remove(tuple) else {
            return S::zero();
        };
        for element in tuple.iter().filter(|&&e| e != removed) {
            remove_from(&mut memory.by_element, element, tuple);
        }
        remove_from(&mut memory.by_next_key, &next_key, tuple);

        if k + 1 < self.levels.len() {
            return S::zero();
        }
        let Some(candidate) = self.candidates.remove(tuple) else {
            return S::zero();
        };
        for (s, key) in candidate.exists_keys.iter().enumerate() {
            remove_from(&mut self.candidate_index[s], key, tuple);
        }
        if candidate.alive {
            self.terminal.retract(tuple)
        } else {
            S::zero()
        }
    }
}
