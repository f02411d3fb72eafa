//! plansmith core - score types and the generic problem model
//!
//! This crate provides the fundamental abstractions the rest of the
//! workspace builds on:
//! - Score types for representing solution quality
//! - A schema-driven problem model (facts, entities, planning variables)
//! - Constraint identity types shared by scoring and analysis

pub mod constraint;
pub mod domain;
pub mod error;
pub mod score;

pub use constraint::{ConstraintRef, ImpactType};
pub use domain::{
    Domain, ElementRef, Entity, EntityClassDef, EntityRef, Fact, FactClassDef, FactKey, FactRegistry,
    FieldDef, FieldId, Problem, ProblemBuilder, ProblemDescriptor, Row, RowKind, Value,
    ValueRangeDef, VariableDef,
};
pub use error::ModelError;
pub use score::{
    DecimalScore, HardMediumSoftDecimalScore, HardMediumSoftScore, HardSoftDecimalScore,
    HardSoftScore, ParseableScore, Score, ScoreLevel, ScoreParseError,
};

pub use rust_decimal::Decimal;
