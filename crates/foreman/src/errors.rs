use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidParameters(String),

    #[error("execution failed: {0}")]
    ExecutionError(String),

    #[error("duplicate name: {0}")]
    DuplicateName(String),

    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error("no final answer after {0} turns")]
    MaxTurnsExceeded(usize),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
