//! Constraint graphs and incremental score tracking.
//!
//! Constraints are declared as tuple pipelines over a [`ProblemDescriptor`]:
//! a source class, optional joins, existence checks and filters, ending in
//! either a direct penalty/reward or a grouped aggregate.
//!
//! ```
//! use std::sync::Arc;
//! use plansmith_core::{EntityClassDef, FieldDef, HardSoftScore, ProblemDescriptor, ValueRangeDef};
//! use plansmith_scoring::ConstraintGraph;
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
//!
//! let graph = ConstraintGraph::<HardSoftScore>::build(descriptor, |factory| {
//!     let row = factory.field("Queen", "row");
//!     vec![factory
//!         .for_each_unique_pair(
//!             "Queen",
//!             vec![plansmith_scoring::joiner::equal(
//!                 move |t| t.row(0).get(row).clone(),
//!                 move |r| r.get(row).clone(),
//!             )],
//!         )
//!         .penalize(HardSoftScore::ONE_HARD)
//!         .as_constraint("Row conflict")]
//! })
//! .unwrap();
//! assert_eq!(graph.len(), 1);
//! ```
//!
//! [`ProblemDescriptor`]: plansmith_core::ProblemDescriptor

pub mod api;
pub mod constraint;
pub mod director;
pub mod error;
pub mod stream;
pub mod tuple;

pub use api::analysis::{
    ConstraintAnalysis, ConstraintJustification, DetailedConstraintMatch, Indictment,
    IndictmentMap, ScoreExplanation,
};
pub use api::weight_overrides::ConstraintWeightOverrides;
pub use constraint::{Constraint, ConstraintGraph};
pub use director::{ScoreDirector, ScoreDirectorError, ScoreMode};
pub use error::GraphError;
pub use stream::collector;
pub use stream::joiner;
pub use stream::{
    ConstraintBuilder, ConstraintFactory, ConstraintStream, FlattenedStream, GroupedStream,
};
pub use tuple::{Tuple, TupleView};
