//! Fluent constraint stream API.
//!
//! Streams start from a [`ConstraintFactory`], are narrowed with filters,
//! joins and existence checks, optionally grouped, and end with a penalty
//! or reward that turns into a named [`Constraint`](crate::Constraint).

pub mod collector;
pub mod joiner;

mod builder;
mod factory;
mod grouped_stream;
mod uni_stream;

use std::sync::Arc;

use plansmith_core::{Row, Value};

use crate::tuple::TupleView;

pub use builder::ConstraintBuilder;
pub use factory::ConstraintFactory;
pub use grouped_stream::{FlattenedStream, GroupedStream};
pub use uni_stream::ConstraintStream;

pub type TuplePredicate = Arc<dyn Fn(&TupleView<'_>) -> bool + Send + Sync>;
pub type TupleFn<T> = Arc<dyn Fn(&TupleView<'_>) -> T + Send + Sync>;
pub type RowFn<T> = Arc<dyn Fn(&Row<'_>) -> T + Send + Sync>;

/// Predicate over a group key and an aggregate or flattened item.
pub type GroupPredicate<T> = Arc<dyn Fn(&Value, &T) -> bool + Send + Sync>;
