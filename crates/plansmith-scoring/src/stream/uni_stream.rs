//! Tuple streams before grouping.

use std::marker::PhantomData;
use std::sync::Arc;

use plansmith_core::{DecimalScore, ImpactType, ModelError, ProblemDescriptor, Score, Value};
use rust_decimal::Decimal;

use crate::constraint::pipeline::{Pipeline, Source, Stage};
use crate::constraint::terminal::{TupleImpact, TupleTerminal};
use crate::tuple::TupleView;

use super::builder::ConstraintBuilder;
use super::collector::Collector;
use super::factory::resolve_source;
use super::grouped_stream::GroupedStream;
use super::joiner::Joiner;

fn tuple_impact<S, F>(f: F) -> TupleImpact<S>
where
    F: Fn(&S, &TupleView<'_>) -> S + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A stream of tuples of fixed arity.
///
/// Each [`join`](Self::join) appends one position; filters and existence
/// checks keep the arity.
pub struct ConstraintStream<S: Score> {
    descriptor: Arc<ProblemDescriptor>,
    root: Source,
    stages: Vec<Stage>,
    arity: usize,
    error: Option<ModelError>,
    _score: PhantomData<fn() -> S>,
}

impl<S: Score> ConstraintStream<S> {
    pub(crate) fn new(
        descriptor: Arc<ProblemDescriptor>,
        root: Source,
        error: Option<ModelError>,
    ) -> Self {
        Self {
            descriptor,
            root,
            stages: Vec::new(),
            arity: 1,
            error,
            _score: PhantomData,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    fn resolve(&mut self, class: &str) -> Source {
        match resolve_source(&self.descriptor, class, false) {
            Ok(source) => source,
            Err(e) => {
                self.error.get_or_insert(e);
                Source::Facts(0)
            }
        }
    }

    /// Keeps tuples matching the predicate.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&TupleView<'_>) -> bool + Send + Sync + 'static,
    {
        self.stages.push(Stage::Filter(Arc::new(predicate)));
        self
    }

    /// Extends each tuple with every element of `class` matching all joiners.
    ///
    /// Entities join only once all their planning variables are assigned.
    pub fn join(mut self, class: &str, joiners: Vec<Joiner>) -> Self {
        let source = self.resolve(class);
        self.stages.push(Stage::Join { source, joiners });
        self.arity += 1;
        self
    }

    /// Keeps tuples for which at least one element of `class` matches.
    pub fn if_exists(mut self, class: &str, joiners: Vec<Joiner>) -> Self {
        let source = self.resolve(class);
        self.stages.push(Stage::Exists {
            source,
            joiners,
            negated: false,
        });
        self
    }

    /// Keeps tuples for which no element of `class` matches.
    pub fn if_not_exists(mut self, class: &str, joiners: Vec<Joiner>) -> Self {
        let source = self.resolve(class);
        self.stages.push(Stage::Exists {
            source,
            joiners,
            negated: true,
        });
        self
    }

    /// Groups tuples by `key` and folds each group with `collector`.
    pub fn group_by<K, C>(self, key: K, collector: C) -> GroupedStream<S, C>
    where
        K: Fn(&TupleView<'_>) -> Value + Send + Sync + 'static,
        C: Collector,
    {
        GroupedStream::new(self.into_parts(), Arc::new(key), collector)
    }

    /// Folds all tuples into a single group keyed by [`Value::None`].
    pub fn group<C: Collector>(self, collector: C) -> GroupedStream<S, C> {
        self.group_by(|_| Value::None, collector)
    }

    /// Each match subtracts `weight`.
    pub fn penalize(self, weight: S) -> ConstraintBuilder<S, TupleTerminal<S>> {
        self.impact(weight, ImpactType::Penalty, tuple_impact::<S, _>(|w, _| *w))
    }

    /// Each match subtracts `weight` times an integer match weight.
    pub fn penalize_with<F>(self, weight: S, match_weight: F) -> ConstraintBuilder<S, TupleTerminal<S>>
    where
        F: Fn(&TupleView<'_>) -> i64 + Send + Sync + 'static,
    {
        self.impact(
            weight,
            ImpactType::Penalty,
            tuple_impact::<S, _>(move |w, t| w.multiply(match_weight(t))),
        )
    }

    pub fn reward(self, weight: S) -> ConstraintBuilder<S, TupleTerminal<S>> {
        self.impact(weight, ImpactType::Reward, tuple_impact::<S, _>(|w, _| *w))
    }

    pub fn reward_with<F>(self, weight: S, match_weight: F) -> ConstraintBuilder<S, TupleTerminal<S>>
    where
        F: Fn(&TupleView<'_>) -> i64 + Send + Sync + 'static,
    {
        self.impact(
            weight,
            ImpactType::Reward,
            tuple_impact::<S, _>(move |w, t| w.multiply(match_weight(t))),
        )
    }

    fn impact(
        self,
        weight: S,
        impact_type: ImpactType,
        impact: TupleImpact<S>,
    ) -> ConstraintBuilder<S, TupleTerminal<S>> {
        let (pipeline, error) = self.into_parts();
        ConstraintBuilder::new(
            pipeline,
            error,
            weight,
            impact_type,
            TupleTerminal {
                impact,
                justify: None,
            },
        )
    }

    pub(crate) fn into_parts(self) -> (Arc<Pipeline>, Option<ModelError>) {
        (Arc::new(Pipeline::compile(self.root, self.stages)), self.error)
    }
}

impl<S: DecimalScore> ConstraintStream<S> {
    /// Each match subtracts `weight` times a decimal match weight.
    pub fn penalize_decimal_with<F>(
        self,
        weight: S,
        match_weight: F,
    ) -> ConstraintBuilder<S, TupleTerminal<S>>
    where
        F: Fn(&TupleView<'_>) -> Decimal + Send + Sync + 'static,
    {
        self.impact(
            weight,
            ImpactType::Penalty,
            tuple_impact::<S, _>(move |w, t| w.multiply_decimal(match_weight(t))),
        )
    }

    pub fn reward_decimal_with<F>(
        self,
        weight: S,
        match_weight: F,
    ) -> ConstraintBuilder<S, TupleTerminal<S>>
    where
        F: Fn(&TupleView<'_>) -> Decimal + Send + Sync + 'static,
    {
        self.impact(
            weight,
            ImpactType::Reward,
            tuple_impact::<S, _>(move |w, t| w.multiply_decimal(match_weight(t))),
        )
    }
}
