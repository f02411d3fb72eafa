//! Streams after `group_by`: one item per group, or per flattened element.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use plansmith_core::{DecimalScore, ImpactType, ModelError, Score, Value};
use rust_decimal::Decimal;

use crate::constraint::pipeline::Pipeline;
use crate::constraint::terminal::{GroupExpand, GroupImpact, GroupTerminal};

use super::builder::ConstraintBuilder;
use super::collector::Collector;
use super::{GroupPredicate, TupleFn};

fn group_impact<S, I, F>(f: F) -> GroupImpact<S, I>
where
    F: Fn(&S, &Value, &I) -> S + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Groups of tuples, each reduced to `(key, C::Result)`.
pub struct GroupedStream<S: Score, C: Collector> {
    pipeline: Arc<Pipeline>,
    error: Option<ModelError>,
    key: TupleFn<Value>,
    collector: C,
    filters: Vec<GroupPredicate<C::Result>>,
    _score: PhantomData<fn() -> S>,
}

impl<S: Score, C: Collector> GroupedStream<S, C> {
    pub(crate) fn new(
        (pipeline, error): (Arc<Pipeline>, Option<ModelError>),
        key: TupleFn<Value>,
        collector: C,
    ) -> Self {
        Self {
            pipeline,
            error,
            key,
            collector,
            filters: Vec::new(),
            _score: PhantomData,
        }
    }

    /// Keeps groups whose key and aggregate match the predicate.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value, &C::Result) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(predicate));
        self
    }

    fn expand_filtered(filters: Vec<GroupPredicate<C::Result>>) -> GroupExpand<C::Result, C::Result> {
        Arc::new(move |key: &Value, result: C::Result| {
            if filters.iter().all(|f| f(key, &result)) {
                vec![result]
            } else {
                Vec::new()
            }
        })
    }

    /// Replaces each group's aggregate with the items `flatten` returns,
    /// e.g. the sequences of a [`SequenceChain`](super::collector::SequenceChain).
    pub fn flatten_last<I, F>(self, flatten: F) -> FlattenedStream<S, C, I>
    where
        I: Debug + Send + Sync + 'static,
        F: Fn(C::Result) -> Vec<I> + Send + Sync + 'static,
    {
        let filters = self.filters;
        let expand: GroupExpand<C::Result, I> = Arc::new(move |key: &Value, result: C::Result| {
            if filters.iter().all(|f| f(key, &result)) {
                flatten(result)
            } else {
                Vec::new()
            }
        });
        FlattenedStream {
            pipeline: self.pipeline,
            error: self.error,
            key: self.key,
            collector: self.collector,
            expand,
            _score: PhantomData,
        }
    }

    fn impact(
        self,
        weight: S,
        impact_type: ImpactType,
        impact: GroupImpact<S, C::Result>,
    ) -> ConstraintBuilder<S, GroupTerminal<S, C, C::Result>> {
        let terminal = GroupTerminal {
            key: self.key,
            collector: self.collector,
            expand: Self::expand_filtered(self.filters),
            impact,
            justify: None,
        };
        ConstraintBuilder::new(self.pipeline, self.error, weight, impact_type, terminal)
    }

    /// Each surviving group subtracts `weight`.
    pub fn penalize(self, weight: S) -> ConstraintBuilder<S, GroupTerminal<S, C, C::Result>> {
        self.impact(weight, ImpactType::Penalty, group_impact::<S, C::Result, _>(|w, _, _| *w))
    }

    pub fn penalize_with<F>(
        self,
        weight: S,
        match_weight: F,
    ) -> ConstraintBuilder<S, GroupTerminal<S, C, C::Result>>
    where
        F: Fn(&Value, &C::Result) -> i64 + Send + Sync + 'static,
    {
        self.impact(
            weight,
            ImpactType::Penalty,
            group_impact::<S, C::Result, _>(move |w, k, r| w.multiply(match_weight(k, r))),
        )
    }

    pub fn reward(self, weight: S) -> ConstraintBuilder<S, GroupTerminal<S, C, C::Result>> {
        self.impact(weight, ImpactType::Reward, group_impact::<S, C::Result, _>(|w, _, _| *w))
    }

    pub fn reward_with<F>(
        self,
        weight: S,
        match_weight: F,
    ) -> ConstraintBuilder<S, GroupTerminal<S, C, C::Result>>
    where
        F: Fn(&Value, &C::Result) -> i64 + Send + Sync + 'static,
    {
        self.impact(
            weight,
            ImpactType::Reward,
            group_impact::<S, C::Result, _>(move |w, k, r| w.multiply(match_weight(k, r))),
        )
    }
}

impl<S: DecimalScore, C: Collector> GroupedStream<S, C> {
    /// Penalizes by a decimal match weight, such as a load balance unfairness.
    pub fn penalize_decimal_with<F>(
        self,
        weight: S,
        match_weight: F,
    ) -> ConstraintBuilder<S, GroupTerminal<S, C, C::Result>>
    where
        F: Fn(&Value, &C::Result) -> Decimal + Send + Sync + 'static,
    {
        self.impact(
            weight,
            ImpactType::Penalty,
            group_impact::<S, C::Result, _>(move |w, k, r| w.multiply_decimal(match_weight(k, r))),
        )
    }

    pub fn reward_decimal_with<F>(
        self,
        weight: S,
        match_weight: F,
    ) -> ConstraintBuilder<S, GroupTerminal<S, C, C::Result>>
    where
        F: Fn(&Value, &C::Result) -> Decimal + Send + Sync + 'static,
    {
        self.impact(
            weight,
            ImpactType::Reward,
            group_impact::<S, C::Result, _>(move |w, k, r| w.multiply_decimal(match_weight(k, r))),
        )
    }
}

/// Groups expanded into `(key, item)` pairs; each item is scored on its own.
pub struct FlattenedStream<S: Score, C: Collector, I> {
    pipeline: Arc<Pipeline>,
    error: Option<ModelError>,
    key: TupleFn<Value>,
    collector: C,
    expand: GroupExpand<C::Result, I>,
    _score: PhantomData<fn() -> S>,
}

impl<S, C, I> FlattenedStream<S, C, I>
where
    S: Score,
    C: Collector,
    I: Debug + Send + Sync + 'static,
{
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&Value, &I) -> bool + Send + Sync + 'static,
    {
        let inner = self.expand;
        let expand: GroupExpand<C::Result, I> = Arc::new(move |key: &Value, result: C::Result| {
            inner(key, result)
                .into_iter()
                .filter(|item| predicate(key, item))
                .collect()
        });
        Self { expand, ..self }
    }

    fn impact(
        self,
        weight: S,
        impact_type: ImpactType,
        impact: GroupImpact<S, I>,
    ) -> ConstraintBuilder<S, GroupTerminal<S, C, I>> {
        let terminal = GroupTerminal {
            key: self.key,
            collector: self.collector,
            expand: self.expand,
            impact,
            justify: None,
        };
        ConstraintBuilder::new(self.pipeline, self.error, weight, impact_type, terminal)
    }

    pub fn penalize(self, weight: S) -> ConstraintBuilder<S, GroupTerminal<S, C, I>> {
        self.impact(weight, ImpactType::Penalty, group_impact::<S, I, _>(|w, _, _| *w))
    }

    pub fn penalize_with<F>(self, weight: S, match_weight: F) -> ConstraintBuilder<S, GroupTerminal<S, C, I>>
    where
        F: Fn(&Value, &I) -> i64 + Send + Sync + 'static,
    {
        self.impact(
            weight,
            ImpactType::Penalty,
            group_impact::<S, I, _>(move |w, k, i| w.multiply(match_weight(k, i))),
        )
    }

    pub fn reward(self, weight: S) -> ConstraintBuilder<S, GroupTerminal<S, C, I>> {
        self.impact(weight, ImpactType::Reward, group_impact::<S, I, _>(|w, _, _| *w))
    }

    pub fn reward_with<F>(self, weight: S, match_weight: F) -> ConstraintBuilder<S, GroupTerminal<S, C, I>>
    where
        F: Fn(&Value, &I) -> i64 + Send + Sync + 'static,
    {
        self.impact(
            weight,
            ImpactType::Reward,
            group_impact::<S, I, _>(move |w, k, i| w.multiply(match_weight(k, i))),
        )
    }
}
