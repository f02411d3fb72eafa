use std::sync::Arc;

use plansmith_core::Row;

use super::Joiner;
use crate::tuple::TupleView;

/// Arbitrary predicate over the tuple and the joined row. Never indexed.
pub fn filtering<F>(predicate: F) -> Joiner
where
    F: Fn(&TupleView<'_>, &Row<'_>) -> bool + Send + Sync + 'static,
{
    Joiner::Filtering(Arc::new(predicate))
}
