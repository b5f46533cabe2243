//! Agent-level error type.
//!
//! Only initialisation can fail fatally; transport and plan errors are
//! absorbed (and logged) inside the loops.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("options error: {0}")]
    Options(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("options parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
