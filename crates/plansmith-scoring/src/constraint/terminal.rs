//! Terminal operations: how matched tuples turn into score.
//!
//! A [`Terminal`] is the immutable definition shared by every score
//! director; [`TerminalState`] is the per-director memory of what each tuple
//! currently contributes.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::sync::Arc;

use plansmith_core::{ElementRef, ImpactType, Problem, Score, Value};

use crate::api::analysis::ConstraintJustification;
use crate::stream::collector::{Accumulator, Collector};
use crate::tuple::{Tuple, TupleView};

/// Weighted magnitude of one tuple match, before the impact sign is applied.
pub type TupleImpact<S> = Arc<dyn Fn(&S, &TupleView<'_>) -> S + Send + Sync>;
pub type TupleJustify = Arc<dyn Fn(&TupleView<'_>) -> String + Send + Sync>;

/// Weighted magnitude of one group item.
pub type GroupImpact<S, I> = Arc<dyn Fn(&S, &Value, &I) -> S + Send + Sync>;
pub type GroupJustify<I> = Arc<dyn Fn(&Value, &I) -> String + Send + Sync>;
/// Turns a group aggregate into the items that are scored.
pub type GroupExpand<R, I> = Arc<dyn Fn(&Value, R) -> Vec<I> + Send + Sync>;

pub trait Terminal<S: Score>: Send + Sync + 'static {
    fn create_state(self: Arc<Self>, weight: S, impact: ImpactType) -> Box<dyn TerminalState<S>>;

    fn is_grouped(&self) -> bool;
}

pub trait TerminalState<S: Score>: Send + Sync {
    /// Adds a live tuple and returns the score delta.
    fn insert(&mut self, tuple: &Tuple, view: &TupleView<'_>) -> S;

    /// Removes a tuple previously inserted and returns the score delta.
    fn retract(&mut self, tuple: &Tuple) -> S;

    fn score(&self) -> S;

    fn match_count(&self) -> usize;

    /// Every current match with its signed contribution.
    fn matches(&self, problem: &Problem<S>) -> Vec<(S, ConstraintJustification)>;
}

/// Every live tuple is one match.
pub struct TupleTerminal<S: Score> {
    pub(crate) impact: TupleImpact<S>,
    pub(crate) justify: Option<TupleJustify>,
}

impl<S: Score> Terminal<S> for TupleTerminal<S> {
    fn create_state(self: Arc<Self>, weight: S, impact: ImpactType) -> Box<dyn TerminalState<S>> {
        Box::new(TupleTerminalState {
            def: self,
            weight,
            impact,
            contributions: HashMap::new(),
            score: S::zero(),
        })
    }

    fn is_grouped(&self) -> bool {
        false
    }
}

struct TupleTerminalState<S: Score> {
    def: Arc<TupleTerminal<S>>,
    weight: S,
    impact: ImpactType,
    contributions: HashMap<Tuple, S>,
    score: S,
}

impl<S: Score> TerminalState<S> for TupleTerminalState<S> {
    fn insert(&mut self, tuple: &Tuple, view: &TupleView<'_>) -> S {
        let contribution = self.impact.apply((self.def.impact)(&self.weight, view));
        if let Some(previous) = self.contributions.insert(tuple.clone(), contribution) {
            self.score = self.score - previous;
        }
        self.score = self.score + contribution;
        contribution
    }

    fn retract(&mut self, tuple: &Tuple) -> S {
        match self.contributions.remove(tuple) {
            Some(contribution) => {
                self.score = self.score - contribution;
                -contribution
            }
            None => S::zero(),
        }
    }

    fn score(&self) -> S {
        self.score
    }

    fn match_count(&self) -> usize {
        self.contributions.len()
    }

    fn matches(&self, problem: &Problem<S>) -> Vec<(S, ConstraintJustification)> {
        let mut out: Vec<(S, ConstraintJustification)> = self
            .contributions
            .iter()
            .map(|(tuple, &score)| {
                let elements = tuple.to_vec();
                let justification = match &self.def.justify {
                    Some(justify) => ConstraintJustification::with_description(
                        elements,
                        justify(&TupleView::new(problem, tuple)),
                    ),
                    None => ConstraintJustification::describe(problem, elements),
                };
                (score, justification)
            })
            .collect();
        out.sort_by(|a, b| a.1.elements.cmp(&b.1.elements));
        out
    }
}

/// Tuples are grouped by key and folded by a collector; each item the
/// aggregate expands to is one match.
pub struct GroupTerminal<S: Score, C: Collector, I> {
    pub(crate) key: Arc<dyn Fn(&TupleView<'_>) -> Value + Send + Sync>,
    pub(crate) collector: C,
    pub(crate) expand: GroupExpand<C::Result, I>,
    pub(crate) impact: GroupImpact<S, I>,
    pub(crate) justify: Option<GroupJustify<I>>,
}

impl<S, C, I> Terminal<S> for GroupTerminal<S, C, I>
where
    S: Score,
    C: Collector,
    I: Debug + Send + Sync + 'static,
{
    fn create_state(self: Arc<Self>, weight: S, impact: ImpactType) -> Box<dyn TerminalState<S>> {
        Box::new(GroupTerminalState {
            def: self,
            weight,
            impact,
            groups: HashMap::new(),
            members: HashMap::new(),
            score: S::zero(),
            match_count: 0,
        })
    }

    fn is_grouped(&self) -> bool {
        true
    }
}

struct GroupSlot<S, A> {
    accumulator: A,
    size: usize,
    score: S,
    matches: usize,
}

struct GroupTerminalState<S: Score, C: Collector, I> {
    def: Arc<GroupTerminal<S, C, I>>,
    weight: S,
    impact: ImpactType,
    groups: HashMap<Value, GroupSlot<S, C::Accumulator>>,
    members: HashMap<Tuple, (Value, C::Value)>,
    score: S,
    match_count: usize,
}

impl<S, C, I> GroupTerminalState<S, C, I>
where
    S: Score,
    C: Collector,
    I: Debug + Send + Sync + 'static,
{
    fn items(&self, key: &Value, slot: &GroupSlot<S, C::Accumulator>) -> Vec<I> {
        (self.def.expand)(key, slot.accumulator.finish())
    }

    /// Recomputes the score of one group and returns the delta.
    fn rescore(&mut self, key: &Value) -> S {
        let Some(slot) = self.groups.get(key) else {
            return S::zero();
        };
        let (old_score, old_matches) = (slot.score, slot.matches);
        if slot.size == 0 {
            self.groups.remove(key);
            self.score = self.score - old_score;
            self.match_count -= old_matches;
            return -old_score;
        }

        let items = self.items(key, slot);
        let new_score = items.iter().fold(S::zero(), |acc, item| {
            acc + self.impact.apply((self.def.impact)(&self.weight, key, item))
        });
        if let Some(slot) = self.groups.get_mut(key) {
            slot.score = new_score;
            slot.matches = items.len();
        }
        self.match_count = self.match_count - old_matches + items.len();
        let delta = new_score - old_score;
        self.score = self.score + delta;
        delta
    }
}

impl<S, C, I> TerminalState<S> for GroupTerminalState<S, C, I>
where
    S: Score,
    C: Collector,
    I: Debug + Send + Sync + 'static,
{
    fn insert(&mut self, tuple: &Tuple, view: &TupleView<'_>) -> S {
        let key = (self.def.key)(view);
        let value = self.def.collector.extract(view);
        let slot = self.groups.entry(key.clone()).or_insert_with(|| GroupSlot {
            accumulator: self.def.collector.create_accumulator(),
            size: 0,
            score: S::zero(),
            matches: 0,
        });
        slot.accumulator.accumulate(&value);
        slot.size += 1;
        self.members.insert(tuple.clone(), (key.clone(), value));
        self.rescore(&key)
    }

    fn retract(&mut self, tuple: &Tuple) -> S {
        let Some((key, value)) = self.members.remove(tuple) else {
            return S::zero();
        };
        if let Some(slot) = self.groups.get_mut(&key) {
            slot.accumulator.retract(&value);
            slot.size -= 1;
        }
        self.rescore(&key)
    }

    fn score(&self) -> S {
        self.score
    }

    fn match_count(&self) -> usize {
        self.match_count
    }

    fn matches(&self, _problem: &Problem<S>) -> Vec<(S, ConstraintJustification)> {
        let mut elements_by_key: HashMap<&Value, BTreeSet<ElementRef>> = HashMap::new();
        for (tuple, (key, _)) in &self.members {
            elements_by_key
                .entry(key)
                .or_default()
                .extend(tuple.iter().copied());
        }

        let mut keys: Vec<&Value> = self.groups.keys().collect();
        keys.sort();
        let mut out = Vec::new();
        for key in keys {
            let slot = &self.groups[key];
            let elements: Vec<ElementRef> = elements_by_key
                .get(key)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            for item in self.items(key, slot) {
                let score = self.impact.apply((self.def.impact)(&self.weight, key, &item));
                let description = match &self.def.justify {
                    Some(justify) => justify(key, &item),
                    None if key.is_none() => format!("{item:?}"),
                    None => format!("{key}: {item:?}"),
                };
                out.push((
                    score,
                    ConstraintJustification::for_group(elements.clone(), key.clone(), description),
                ));
            }
        }
        out
    }
}
