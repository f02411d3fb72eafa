//! Errors raised while building a constraint graph.

use plansmith_core::ModelError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A class or field lookup inside the constraint provider failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("constraint '{constraint}': {source}")]
    InConstraint {
        constraint: String,
        #[source]
        source: ModelError,
    },

    #[error("duplicate constraint name '{0}'")]
    DuplicateConstraint(String),

    #[error("constraint '{0}' has a zero weight")]
    ZeroWeight(String),

    #[error("weight override names unknown constraint '{0}'")]
    UnknownConstraint(String),
}
