//! Generic problem model.
//!
//! A [`ProblemDescriptor`] declares fact classes and entity classes, each a
//! list of named fields. Entity fields may be planning variables with a
//! value range. A [`Problem`] is an instance of a descriptor: immutable facts
//! held in a shared [`FactRegistry`], mutable entities, and the current score.
//!
//! Entities refer to facts through [`FactKey`] values that are resolved by
//! key through the registry, never by holding the fact itself.

mod descriptor;
mod problem;
mod registry;
mod row;
mod value;


pub use descriptor::{
    EntityClassDef, FactClassDef, FieldDef, FieldId, ProblemDescriptor, ProblemDescriptorBuilder,
    ValueRangeDef, VariableDef,
};
pub use problem::{Domain, ElementRef, Entity, EntityRef, Problem, ProblemBuilder};
pub use registry::{Fact, FactRegistry};
pub use row::{Row, RowKind};
pub use value::{FactKey, Value};
