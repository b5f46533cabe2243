//! Grid-subsystem error type.

use thiserror::Error;

use courier_core::Point;

/// Errors produced by `courier-grid`.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("no path from {from} to {to}")]
    PathNotFound { from: Point, to: Point },

    #[error("tile list does not fit a {width}x{height} grid: {detail}")]
    MalformedMap {
        width:  u32,
        height: u32,
        detail: String,
    },

    #[error("map parse error: {0}")]
    Parse(String),
}

pub type GridResult<T> = Result<T, GridError>;
