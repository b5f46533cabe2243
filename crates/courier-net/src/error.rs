//! Network-subsystem error type.

use thiserror::Error;

/// Errors produced by `courier-net`.
#[derive(Debug, Error)]
pub enum NetError {
    /// The transport failed to carry a message or action.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A peer message could not be interpreted.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The three-way handshake broke down.
    #[error("handshake failed: {0}")]
    Handshake(String),
}

pub type NetResult<T> = Result<T, NetError>;
