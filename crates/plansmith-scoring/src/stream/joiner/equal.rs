use std::sync::Arc;

use plansmith_core::{Row, Value};

use super::Joiner;
use crate::tuple::TupleView;

/// Matches when the tuple's left key equals the row's right key.
pub fn equal<L, R>(left: L, right: R) -> Joiner
where
    L: Fn(&TupleView<'_>) -> Value + Send + Sync + 'static,
    R: Fn(&Row<'_>) -> Value + Send + Sync + 'static,
{
    Joiner::Equal {
        left: Arc::new(left),
        right: Arc::new(right),
    }
}
