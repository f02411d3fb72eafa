//! Final step of a stream: naming the constraint.

use std::fmt::Debug;
use std::sync::Arc;

use plansmith_core::{ConstraintRef, ImpactType, ModelError, Score, Value};

use crate::constraint::pipeline::Pipeline;
use crate::constraint::terminal::{GroupTerminal, Terminal, TupleTerminal};
use crate::constraint::Constraint;
use crate::tuple::TupleView;

use super::collector::Collector;

/// A weighted stream waiting for its name.
pub struct ConstraintBuilder<S: Score, T> {
    pipeline: Arc<Pipeline>,
    error: Option<ModelError>,
    weight: S,
    impact_type: ImpactType,
    terminal: T,
}

impl<S: Score, T: Terminal<S>> ConstraintBuilder<S, T> {
    pub(crate) fn new(
        pipeline: Arc<Pipeline>,
        error: Option<ModelError>,
        weight: S,
        impact_type: ImpactType,
        terminal: T,
    ) -> Self {
        Self {
            pipeline,
            error,
            weight,
            impact_type,
            terminal,
        }
    }

    pub fn as_constraint(self, name: impl Into<String>) -> Constraint<S> {
        self.as_constraint_in("", name)
    }

    /// Names the constraint inside a package, shown as `package/name`.
    pub fn as_constraint_in(self, package: impl Into<String>, name: impl Into<String>) -> Constraint<S> {
        Constraint {
            constraint_ref: ConstraintRef::new(package, name),
            weight: self.weight,
            impact_type: self.impact_type,
            pipeline: self.pipeline,
            terminal: Arc::new(self.terminal),
            error: self.error,
        }
    }
}

impl<S: Score> ConstraintBuilder<S, TupleTerminal<S>> {
    /// Custom description of each match in score analysis.
    pub fn justify_with<F>(mut self, describe: F) -> Self
    where
        F: Fn(&TupleView<'_>) -> String + Send + Sync + 'static,
    {
        self.terminal.justify = Some(Arc::new(describe));
        self
    }
}

impl<S, C, I> ConstraintBuilder<S, GroupTerminal<S, C, I>>
where
    S: Score,
    C: Collector,
    I: Debug + Send + Sync + 'static,
{
    pub fn justify_with<F>(mut self, describe: F) -> Self
    where
        F: Fn(&Value, &I) -> String + Send + Sync + 'static,
    {
        self.terminal.justify = Some(Arc::new(describe));
        self
    }
}
