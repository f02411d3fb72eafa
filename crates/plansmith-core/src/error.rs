//! Error types for the problem model

use thiserror::Error;

/// Errors raised while defining or populating a problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown entity class '{0}'")]
    UnknownEntityClass(String),

    #[error("unknown class '{0}'")]
    UnknownClass(String),

    #[error("unknown fact class '{0}'")]
    UnknownFactClass(String),

    #[error("class '{class}' has no field '{field}'")]
    UnknownField { class: String, field: String },

    #[error("field '{field}' of class '{class}' is not a planning variable")]
    NotAVariable { class: String, field: String },

    #[error("duplicate class name '{0}'")]
    DuplicateClass(String),

    #[error("duplicate id {id} in class '{class}'")]
    DuplicateId { class: String, id: i64 },

    #[error("record {id} of class '{class}' has {actual} fields, expected {expected}")]
    FieldCount {
        class: String,
        id: i64,
        expected: usize,
        actual: usize,
    },

    #[error("reference to {class}#{id} does not resolve")]
    UnresolvedReference { class: String, id: i64 },

    #[error("planning variable '{variable}' of class '{class}' has an empty value range")]
    EmptyValueRange { class: String, variable: String },

    #[error("value {value} is outside the range of '{variable}' on {class}#{id}")]
    ValueOutOfRange {
        class: String,
        id: i64,
        variable: String,
        value: String,
    },

    #[error("entity {class}#{id} is pinned")]
    PinnedEntity { class: String, id: i64 },

    #[error("entity index {index} is out of bounds for class '{class}'")]
    EntityOutOfBounds { class: String, index: usize },
}
