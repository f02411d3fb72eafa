//! Constraint definitions and the graph a score director evaluates.

mod node;
pub mod pipeline;
pub mod terminal;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::sync::Arc;

use plansmith_core::{ConstraintRef, ImpactType, ModelError, Problem, ProblemDescriptor, Score, ScoreLevel};
use rayon::prelude::*;
use tracing::debug;

use crate::api::analysis::{ConstraintAnalysis, DetailedConstraintMatch, ScoreExplanation};
use crate::api::weight_overrides::ConstraintWeightOverrides;
use crate::error::GraphError;
use crate::stream::ConstraintFactory;
use crate::tuple::TupleView;

pub(crate) use node::ConstraintNode;
use pipeline::Pipeline;
use terminal::{Terminal, TerminalState};

/// A named, weighted constraint: a pipeline plus a terminal.
pub struct Constraint<S: Score> {
    pub(crate) constraint_ref: ConstraintRef,
    pub(crate) weight: S,
    pub(crate) impact_type: ImpactType,
    pub(crate) pipeline: Arc<Pipeline>,
    pub(crate) terminal: Arc<dyn Terminal<S>>,
    /// Name resolution failure recorded while the stream was declared.
    pub(crate) error: Option<ModelError>,
}

impl<S: Score> Constraint<S> {
    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }

    pub fn constraint_ref(&self) -> &ConstraintRef {
        &self.constraint_ref
    }

    pub fn weight(&self) -> S {
        self.weight
    }

    pub fn impact_type(&self) -> ImpactType {
        self.impact_type
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn is_grouped(&self) -> bool {
        self.terminal.is_grouped()
    }

    /// True when the highest non-zero level of the weight is a hard level.
    pub fn is_hard(&self) -> bool {
        self.weight
            .to_level_numbers()
            .iter()
            .position(|&n| n != 0.0)
            .and_then(S::level_label)
            == Some(ScoreLevel::Hard)
    }

    pub(crate) fn create_state(&self) -> Box<dyn TerminalState<S>> {
        Arc::clone(&self.terminal).create_state(self.weight, self.impact_type)
    }

    fn reweighted(&self, weight: S) -> Self {
        Self {
            constraint_ref: self.constraint_ref.clone(),
            weight,
            impact_type: self.impact_type,
            pipeline: Arc::clone(&self.pipeline),
            terminal: Arc::clone(&self.terminal),
            error: self.error.clone(),
        }
    }

    /// Evaluates from scratch, sharing nothing with incremental memory.
    fn evaluate_state(&self, problem: &Problem<S>) -> Box<dyn TerminalState<S>> {
        let mut state = self.create_state();
        for tuple in self.pipeline.enumerate(problem) {
            state.insert(&tuple, &TupleView::new(problem, &tuple));
        }
        state
    }

    pub fn evaluate(&self, problem: &Problem<S>) -> S {
        self.evaluate_state(problem).score()
    }

    pub fn analyze(&self, problem: &Problem<S>) -> ConstraintAnalysis<S> {
        let state = self.evaluate_state(problem);
        let matches = state
            .matches(problem)
            .into_iter()
            .map(|(score, justification)| {
                DetailedConstraintMatch::new(self.constraint_ref.clone(), score, justification)
            })
            .collect();
        ConstraintAnalysis::new(
            self.constraint_ref.clone(),
            self.weight,
            state.score(),
            matches,
            self.is_hard(),
        )
    }
}

impl<S: Score> std::fmt::Debug for Constraint<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.constraint_ref.full_name())
            .field("weight", &self.weight)
            .field("impact", &self.impact_type)
            .field("arity", &self.pipeline.arity())
            .finish()
    }
}

/// The validated set of constraints for one problem descriptor.
pub struct ConstraintGraph<S: Score> {
    descriptor: Arc<ProblemDescriptor>,
    constraints: Vec<Arc<Constraint<S>>>,
}

impl<S: Score> ConstraintGraph<S> {
    /// Runs `provider` against a factory for `descriptor` and validates the result.
    ///
    /// Fails on unknown classes or fields, duplicate constraint names and
    /// zero weights.
    pub fn build<F>(descriptor: Arc<ProblemDescriptor>, provider: F) -> Result<Self, GraphError>
    where
        F: FnOnce(&ConstraintFactory<S>) -> Vec<Constraint<S>>,
    {
        let factory = ConstraintFactory::new(Arc::clone(&descriptor));
        let constraints = provider(&factory);
        if let Some(error) = factory.take_error() {
            return Err(GraphError::Model(error));
        }

        let mut names = HashSet::new();
        for constraint in &constraints {
            if let Some(error) = &constraint.error {
                return Err(GraphError::InConstraint {
                    constraint: constraint.constraint_ref.full_name(),
                    source: error.clone(),
                });
            }
            if !names.insert(constraint.constraint_ref.full_name()) {
                return Err(GraphError::DuplicateConstraint(
                    constraint.constraint_ref.full_name(),
                ));
            }
            if constraint.weight == S::zero() {
                return Err(GraphError::ZeroWeight(constraint.constraint_ref.full_name()));
            }
        }

        debug!(
            event = "constraint_graph_built",
            constraints = constraints.len(),
        );
        Ok(Self {
            descriptor,
            constraints: constraints.into_iter().map(Arc::new).collect(),
        })
    }

    /// Returns a copy with weights replaced by name; a zero weight drops the constraint.
    pub fn with_overrides(&self, overrides: &ConstraintWeightOverrides<S>) -> Result<Self, GraphError> {
        for name in overrides.names() {
            if self.constraint(name).is_none() {
                return Err(GraphError::UnknownConstraint(name.to_string()));
            }
        }
        let constraints = self
            .constraints
            .iter()
            .filter_map(|c| match overrides.get(c.name()) {
                None => Some(Arc::clone(c)),
                Some(&w) if w == S::zero() => None,
                Some(&w) => Some(Arc::new(c.reweighted(w))),
            })
            .collect();
        Ok(Self {
            descriptor: Arc::clone(&self.descriptor),
            constraints,
        })
    }

    pub fn descriptor(&self) -> &Arc<ProblemDescriptor> {
        &self.descriptor
    }

    pub fn constraints(&self) -> &[Arc<Constraint<S>>] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&Arc<Constraint<S>>> {
        self.constraints
            .iter()
            .find(|c| c.name() == name || c.constraint_ref.full_name() == name)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// True when `problem` was built against this graph's descriptor.
    pub fn accepts(&self, problem: &Problem<S>) -> bool {
        Arc::ptr_eq(&self.descriptor, problem.descriptor())
            || *self.descriptor == **problem.descriptor()
    }

    /// Full recompute of the total score.
    pub fn evaluate(&self, problem: &Problem<S>) -> S {
        self.constraints
            .par_iter()
            .map(|c| c.evaluate(problem))
            .reduce(S::zero, |a, b| a + b)
    }

    /// Full recompute with per-constraint and per-match detail.
    pub fn explain(&self, problem: &Problem<S>) -> ScoreExplanation<S> {
        let analyses: Vec<ConstraintAnalysis<S>> = self
            .constraints
            .par_iter()
            .map(|c| c.analyze(problem))
            .collect();
        let score = analyses.iter().fold(S::zero(), |acc, a| acc + a.score);
        ScoreExplanation::new(score, analyses)
    }

    /// One line per constraint: name, weight and pipeline outline.
    pub fn describe(&self) -> Vec<String> {
        self.constraints
            .iter()
            .map(|c| {
                format!(
                    "{} [{}] {}",
                    c.constraint_ref.full_name(),
                    c.weight,
                    c.pipeline.describe(&self.descriptor)
                )
            })
            .collect()
    }
}

impl<S: Score> std::fmt::Debug for ConstraintGraph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintGraph")
            .field("constraints", &self.constraints)
            .finish()
    }
}
