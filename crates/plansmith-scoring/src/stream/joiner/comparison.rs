use std::sync::Arc;

use plansmith_core::{Row, Value};

use super::{Comparison, Joiner};
use crate::tuple::TupleView;

fn compare<L, R>(comparison: Comparison, left: L, right: R) -> Joiner
where
    L: Fn(&TupleView<'_>) -> Value + Send + Sync + 'static,
    R: Fn(&Row<'_>) -> Value + Send + Sync + 'static,
{
    Joiner::Compare {
        comparison,
        left: Arc::new(left),
        right: Arc::new(right),
    }
}

pub fn less_than<L, R>(left: L, right: R) -> Joiner
where
    L: Fn(&TupleView<'_>) -> Value + Send + Sync + 'static,
    R: Fn(&Row<'_>) -> Value + Send + Sync + 'static,
{
    compare(Comparison::LessThan, left, right)
}

pub fn less_than_or_equal<L, R>(left: L, right: R) -> Joiner
where
    L: Fn(&TupleView<'_>) -> Value + Send + Sync + 'static,
    R: Fn(&Row<'_>) -> Value + Send + Sync + 'static,
{
    compare(Comparison::LessThanOrEqual, left, right)
}

pub fn greater_than<L, R>(left: L, right: R) -> Joiner
where
    L: Fn(&TupleView<'_>) -> Value + Send + Sync + 'static,
    R: Fn(&Row<'_>) -> Value + Send + Sync + 'static,
{
    compare(Comparison::GreaterThan, left, right)
}

pub fn greater_than_or_equal<L, R>(left: L, right: R) -> Joiner
where
    L: Fn(&TupleView<'_>) -> Value + Send + Sync + 'static,
    R: Fn(&Row<'_>) -> Value + Send + Sync + 'static,
{
    compare(Comparison::GreaterThanOrEqual, left, right)
}
