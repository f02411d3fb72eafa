use std::sync::Arc;

use plansmith_core::{Row, Value};

use super::Joiner;
use crate::tuple::TupleView;

/// Matches when `[left_start, left_end)` and `[right_start, right_end)` intersect.
///
/// Intervals that merely touch (`left_end == right_start`) do not overlap.
pub fn overlapping<LS, LE, RS, RE>(
    left_start: LS,
    left_end: LE,
    right_start: RS,
    right_end: RE,
) -> Joiner
where
    LS: Fn(&TupleView<'_>) -> Value + Send + Sync + 'static,
    LE: Fn(&TupleView<'_>) -> Value + Send + Sync + 'static,
    RS: Fn(&Row<'_>) -> Value + Send + Sync + 'static,
    RE: Fn(&Row<'_>) -> Value + Send + Sync + 'static,
{
    Joiner::Overlapping {
        left_start: Arc::new(left_start),
        left_end: Arc::new(left_end),
        right_start: Arc::new(right_start),
        right_end: Arc::new(right_end),
    }
}
