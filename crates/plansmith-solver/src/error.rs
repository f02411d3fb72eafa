//! Error types for building and running solvers.

use plansmith_core::{ModelError, ScoreParseError};
use plansmith_scoring::{GraphError, ScoreDirectorError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    ScoreDirector(#[from] ScoreDirectorError),

    #[error("invalid score in configuration: {0}")]
    ScoreParse(#[from] ScoreParseError),

    #[error("invalid solver configuration: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum ManagerError {
    /// A job with this id is still scheduled or running.
    #[error("problem {0} is already being solved")]
    Conflict(String),

    #[error("no job for problem {0}")]
    NotFound(String),

    #[error("failed to start solver thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error(transparent)]
    Build(#[from] SolverError),
}
