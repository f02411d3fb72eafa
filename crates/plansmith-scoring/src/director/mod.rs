//! Score director: owns the working problem and keeps its score current.
//!
//! Every change to a planning variable goes through
//! [`ScoreDirector::change_variable`], which validates it, retracts the
//! entity from the constraint nodes that read its class, applies the change
//! and inserts the entity again. The cached score is therefore never stale.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use plansmith_core::{ElementRef, EntityRef, FieldId, ModelError, Problem, Score, Value};
use thiserror::Error;
use tracing::{error, trace};

use crate::api::analysis::ScoreExplanation;
use crate::constraint::{ConstraintGraph, ConstraintNode};

/// How the director computes scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreMode {
    /// Delta updates through constraint node memory.
    #[default]
    Incremental,
    /// Every score is recomputed from scratch. Slow; for verification.
    FullRecompute,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreDirectorError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("problem was built against a different descriptor than the constraint graph")]
    DescriptorMismatch,

    /// Incremental and full scores disagree.
    #[error("score corruption: incremental {incremental}, full {full} (constraints: {constraints})")]
    ScoreCorruption {
        incremental: String,
        full: String,
        constraints: String,
    },
}

pub struct ScoreDirector<S: Score> {
    graph: Arc<ConstraintGraph<S>>,
    working_solution: Problem<S>,
    nodes: Vec<ConstraintNode<S>>,
    /// Entity class to the nodes reading it.
    class_nodes: Vec<Vec<usize>>,
    mode: ScoreMode,
    cached_score: S,
    initialized: bool,
    calculation_count: u64,
}

impl<S: Score> ScoreDirector<S> {
    pub fn new(problem: Problem<S>, graph: Arc<ConstraintGraph<S>>) -> Result<Self, ScoreDirectorError> {
        Self::with_mode(problem, graph, ScoreMode::Incremental)
    }

    pub fn with_mode(
        problem: Problem<S>,
        graph: Arc<ConstraintGraph<S>>,
        mode: ScoreMode,
    ) -> Result<Self, ScoreDirectorError> {
        if !graph.accepts(&problem) {
            return Err(ScoreDirectorError::DescriptorMismatch);
        }
        let nodes: Vec<ConstraintNode<S>> = graph
            .constraints()
            .iter()
            .map(|c| ConstraintNode::new(Arc::clone(c)))
            .collect();
        let class_nodes = (0..problem.entity_class_count())
            .map(|class| {
                nodes
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| n.reads_entity_class(class))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        Ok(Self {
            graph,
            working_solution: problem,
            nodes,
            class_nodes,
            mode,
            cached_score: S::zero(),
            initialized: false,
            calculation_count: 0,
        })
    }

    pub fn mode(&self) -> ScoreMode {
        self.mode
    }

    pub fn graph(&self) -> &Arc<ConstraintGraph<S>> {
        &self.graph
    }

    pub fn working_solution(&self) -> &Problem<S> {
        &self.working_solution
    }

    /// Calculates and returns the current score.
    ///
    /// In incremental mode the first call builds all node memory; later
    /// calls return the cached score.
    pub fn calculate_score(&mut self) -> S {
        self.calculation_count += 1;
        let score = match self.mode {
            ScoreMode::Incremental => {
                if !self.initialized {
                    self.initialize();
                }
                self.cached_score
            }
            ScoreMode::FullRecompute => self.graph.evaluate(&self.working_solution),
        };
        self.working_solution.set_score(Some(score));
        score
    }

    fn initialize(&mut self) {
        let problem = &self.working_solution;
        self.cached_score = self
            .nodes
            .iter_mut()
            .fold(S::zero(), |acc, node| acc + node.initialize(problem));
        self.initialized = true;
        trace!(event = "score_director_initialized", score = %self.cached_score);
    }

    fn before_variable_changed(&mut self, entity: EntityRef) {
        if self.mode != ScoreMode::Incremental || !self.initialized {
            return;
        }
        let element = ElementRef::Entity(entity);
        let mut delta = S::zero();
        for &i in &self.class_nodes[entity.class] {
            delta = delta + self.nodes[i].retract(&self.working_solution, element);
        }
        self.cached_score = self.cached_score + delta;
    }

    fn after_variable_changed(&mut self, entity: EntityRef) {
        if self.mode != ScoreMode::Incremental || !self.initialized {
            return;
        }
        let element = ElementRef::Entity(entity);
        let mut delta = S::zero();
        for &i in &self.class_nodes[entity.class] {
            delta = delta + self.nodes[i].insert(&self.working_solution, element);
        }
        self.cached_score = self.cached_score + delta;
    }

    /// Assigns a planning variable and updates the score.
    ///
    /// The change is validated before anything is touched: a pinned entity,
    /// an unknown variable or an out-of-range value leaves both the problem
    /// and the score unchanged. Returns the previous value.
    pub fn change_variable(
        &mut self,
        entity: EntityRef,
        field: FieldId,
        value: Value,
    ) -> Result<Value, ScoreDirectorError> {
        self.working_solution.check_change(entity, field, &value)?;
        self.before_variable_changed(entity);
        let previous = self.working_solution.set_variable(entity, field, value)?;
        self.after_variable_changed(entity);
        self.working_solution.set_score(None);
        Ok(previous)
    }

    /// Reverts a change made through [`change_variable`](Self::change_variable).
    ///
    /// `previous` is the value that call returned. Unlike a forward change it
    /// may be an unassigned value the variable's range does not allow.
    pub fn undo_change(
        &mut self,
        entity: EntityRef,
        field: FieldId,
        previous: Value,
    ) -> Result<(), ScoreDirectorError> {
        let problem = &self.working_solution;
        let valid = problem.domain(entity.class, field).is_some()
            && problem.entity(entity).is_some()
            && !problem.is_pinned(entity);
        if !valid {
            // reports the reason without touching node memory
            self.working_solution.restore_variable(entity, field, previous)?;
            return Ok(());
        }
        self.before_variable_changed(entity);
        self.working_solution.restore_variable(entity, field, previous)?;
        self.after_variable_changed(entity);
        self.working_solution.set_score(None);
        Ok(())
    }

    /// Cached score without recalculation; zero before the first calculation.
    pub fn get_score(&self) -> S {
        self.cached_score
    }

    /// Full recompute, independent of node memory.
    pub fn full_score(&self) -> S {
        self.graph.evaluate(&self.working_solution)
    }

    /// Compares the incremental score with a full recompute.
    pub fn assert_consistent(&mut self) -> Result<S, ScoreDirectorError> {
        let incremental = self.calculate_score();
        let full = self.full_score();
        if incremental == full {
            return Ok(full);
        }

        let problem = &self.working_solution;
        let constraints = if self.mode == ScoreMode::Incremental {
            self.nodes
                .iter()
                .filter(|n| n.score() != n.constraint().evaluate(problem))
                .map(|n| n.constraint().name().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            String::new()
        };
        error!(
            event = "score_corruption",
            incremental = %incremental,
            full = %full,
            constraints = %constraints,
        );
        Err(ScoreDirectorError::ScoreCorruption {
            incremental: incremental.to_string(),
            full: full.to_string(),
            constraints,
        })
    }

    /// Per-constraint breakdown of the current score.
    ///
    /// Read-only; never disturbs incremental state.
    pub fn explain(&self) -> ScoreExplanation<S> {
        self.graph.explain(&self.working_solution)
    }

    /// Discards node memory; the next calculation rebuilds it.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            *node = ConstraintNode::new(Arc::clone(node.constraint()));
        }
        self.initialized = false;
        self.cached_score = S::zero();
    }

    /// Match count per constraint, from node memory when available.
    pub fn match_counts(&mut self) -> Vec<(String, usize)> {
        if self.mode == ScoreMode::Incremental && !self.initialized {
            self.initialize();
        }
        match self.mode {
            ScoreMode::Incremental => self
                .nodes
                .iter()
                .map(|n| (n.constraint().name().to_string(), n.terminal().match_count()))
                .collect(),
            ScoreMode::FullRecompute => self
                .graph
                .constraints()
                .iter()
                .map(|c| (c.name().to_string(), c.analyze(&self.working_solution).match_count()))
                .collect(),
        }
    }

    /// Copy of the working solution with its score set.
    pub fn clone_working_solution(&mut self) -> Problem<S> {
        let score = self.calculate_score();
        let mut problem = self.working_solution.clone();
        problem.set_score(Some(score));
        problem
    }

    /// Consumes the director and returns the working solution with its score.
    pub fn take_solution(mut self) -> Problem<S> {
        let score = self.calculate_score();
        self.working_solution.set_score(Some(score));
        self.working_solution
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn constraint_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of score calculations requested so far.
    pub fn calculation_count(&self) -> u64 {
        self.calculation_count
    }
}

impl<S: Score> std::fmt::Debug for ScoreDirector<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreDirector")
            .field("mode", &self.mode)
            .field("initialized", &self.initialized)
            .field("cached_score", &self.cached_score)
            .field("constraints", &self.nodes.len())
            .finish()
    }
}
