//! Plansmith - constraint-based planning and scheduling
//!
//! Describe the problem as data, declare constraints as stream pipelines,
//! then solve it directly with a [`Solver`] or as background jobs through a
//! [`SolverManager`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use plansmith::prelude::*;
//!
//! let descriptor = Arc::new(
//!     ProblemDescriptor::builder()
//!         .entity_class(EntityClassDef::new(
//!             "Queen",
//!             vec![FieldDef::planning_variable("row", ValueRangeDef::int_range(0, 4))],
//!         ))
//!         .build()
//!         .unwrap(),
//! );
//! let graph = ConstraintGraph::<HardSoftScore>::build(Arc::clone(&descriptor), |factory| {
//!     let row = factory.field("Queen", "row");
//!     vec![factory
//!         .for_each_unique_pair(
//!             "Queen",
//!             vec![joiner::equal(
//!                 move |t| t.row(0).get(row).clone(),
//!                 move |r| r.get(row).clone(),
//!             )],
//!         )
//!         .penalize(HardSoftScore::ONE_HARD)
//!         .as_constraint("Row conflict")]
//! })
//! .unwrap();
//!
//! let mut builder = Problem::builder(descriptor);
//! for id in 0..4 {
//!     builder = builder.entity("Queen", Entity::new(id, vec![Value::None]));
//! }
//! let problem = builder.build().unwrap();
//!
//! let config = SolverConfig::new().with_random_seed(3).with_termination(TerminationConfig {
//!     step_count_limit: Some(100),
//!     ..Default::default()
//! });
//! let result = Solver::new(Arc::new(graph), config).unwrap().solve(problem).unwrap();
//! assert_eq!(result.solution.score(), Some(result.score));
//! ```

pub use plansmith_config::{
    ConfigError, EnvironmentMode, PhaseConfig, SolverConfig, SolverManagerConfig, TerminationConfig,
};
pub use plansmith_core::{
    Decimal, Entity, EntityClassDef, EntityRef, Fact, FactClassDef, FieldDef, HardMediumSoftDecimalScore,
    HardMediumSoftScore, HardSoftDecimalScore, HardSoftScore, ModelError, ParseableScore, Problem,
    ProblemDescriptor, Score, Value, ValueRangeDef,
};
pub use plansmith_scoring::{
    collector, joiner, ConstraintFactory, ConstraintGraph, ConstraintWeightOverrides, GraphError,
    ScoreDirector, ScoreExplanation,
};
pub use plansmith_solver::{
    ManagerError, SolveResult, Solver, SolverError, SolverEvent, SolverEventListener, SolverManager,
    SolverState, SolverStatus,
};

#[cfg(feature = "console")]
pub mod console;

pub mod prelude {
    pub use super::{
        collector, joiner, ConstraintFactory, ConstraintGraph, Entity, EntityClassDef, Fact,
        FactClassDef, FieldDef, HardMediumSoftScore, HardSoftScore, Problem, ProblemDescriptor,
        Score, Solver, SolverConfig, SolverEvent, SolverManager, SolverManagerConfig,
        SolverStatus, TerminationConfig, Value, ValueRangeDef,
    };
}
