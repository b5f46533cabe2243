//! Arena error type.

use thiserror::Error;

use courier_core::Point;
use courier_grid::GridError;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error(transparent)]
    Map(#[from] GridError),

    #[error("start tile {0} is not walkable")]
    BadStart(Point),

    #[error("agent {0} already joined")]
    DuplicateAgent(String),
}

pub type ArenaResult<T> = Result<T, ArenaError>;
