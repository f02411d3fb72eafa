//! Entry point of the stream API.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use plansmith_core::{FieldId, ModelError, ProblemDescriptor, Score, Value};

use crate::constraint::pipeline::Source;

use super::joiner::{less_than, Joiner};
use super::uni_stream::ConstraintStream;

/// Creates streams over the classes of one problem descriptor.
///
/// Lookups never fail at the call site: a bad class or field name is
/// recorded and reported by [`ConstraintGraph::build`](crate::ConstraintGraph::build).
pub struct ConstraintFactory<S: Score> {
    descriptor: Arc<ProblemDescriptor>,
    error: RefCell<Option<ModelError>>,
    _score: PhantomData<fn() -> S>,
}

impl<S: Score> ConstraintFactory<S> {
    pub(crate) fn new(descriptor: Arc<ProblemDescriptor>) -> Self {
        Self {
            descriptor,
            error: RefCell::new(None),
            _score: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &ProblemDescriptor {
        &self.descriptor
    }

    fn record<T: Default>(&self, result: Result<T, ModelError>) -> T {
        result.unwrap_or_else(|e| {
            self.error.borrow_mut().get_or_insert(e);
            T::default()
        })
    }

    pub(crate) fn take_error(&self) -> Option<ModelError> {
        self.error.borrow_mut().take()
    }

    /// Field of an entity or fact class.
    pub fn field(&self, class: &str, field: &str) -> FieldId {
        self.record(self.descriptor.field(class, field))
    }

    /// Every fact, or every entity with all planning variables assigned.
    pub fn for_each(&self, class: &str) -> ConstraintStream<S> {
        self.stream(resolve_source(&self.descriptor, class, false))
    }

    /// Every entity of the class, assigned or not.
    pub fn for_each_including_unassigned(&self, class: &str) -> ConstraintStream<S> {
        self.stream(resolve_source(&self.descriptor, class, true))
    }

    /// Every unordered pair `(a, b)` of distinct elements with `a.id < b.id`.
    pub fn for_each_unique_pair(&self, class: &str, joiners: Vec<Joiner>) -> ConstraintStream<S> {
        let mut joiners = joiners;
        joiners.push(less_than(
            |t| Value::Int(t.row(0).id()),
            |r| Value::Int(r.id()),
        ));
        self.for_each(class).join(class, joiners)
    }

    fn stream(&self, source: Result<Source, ModelError>) -> ConstraintStream<S> {
        match source {
            Ok(source) => ConstraintStream::new(Arc::clone(&self.descriptor), source, None),
            Err(e) => ConstraintStream::new(Arc::clone(&self.descriptor), Source::Facts(0), Some(e)),
        }
    }
}

/// Entity classes take precedence over fact classes of the same name.
pub(crate) fn resolve_source(
    descriptor: &ProblemDescriptor,
    class: &str,
    include_unassigned: bool,
) -> Result<Source, ModelError> {
    if let Ok(index) = descriptor.entity_class_index(class) {
        return Ok(Source::Entities {
            class: index,
            include_unassigned,
        });
    }
    descriptor
        .fact_class_index(class)
        .map(Source::Facts)
        .map_err(|_| ModelError::UnknownClass(class.to_string()))
}
