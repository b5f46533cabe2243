//! Plan-execution error taxonomy.
//!
//! Every variant is recovered at the intention-loop level: the failed
//! intention is popped and deliberation produces a fresh one.  Nothing here
//! aborts the process.

use thiserror::Error;

use courier_core::{Move, Point};
use courier_grid::GridError;
use courier_net::NetError;
use courier_policy::PredicateKind;

#[derive(Debug, Error)]
pub enum PlanError {
    /// A* exhausted the frontier; the intention is stuck until beliefs
    /// change.
    #[error("no path from {from} to {to}")]
    PathNotFound { from: Point, to: Point },

    /// The simulator refused a step (tile became occupied mid-plan).
    #[error("move {direction} rejected at {at}")]
    MoveFailed { direction: Move, at: Point },

    /// Cooperative cancellation observed; unwinds silently.
    #[error("intention stopped")]
    Stopped,

    /// A belief update invalidated the plan's precondition.
    #[error("plan precondition no longer holds: {0}")]
    StateMismatch(String),

    /// The predicate matched nothing in the plan library.
    #[error("no plan satisfies a {0:?} intention")]
    NoApplicablePlan(PredicateKind),

    /// Actuator or network failure.
    #[error(transparent)]
    Transport(#[from] NetError),
}

impl From<GridError> for PlanError {
    fn from(e: GridError) -> Self {
        match e {
            GridError::PathNotFound { from, to } => PlanError::PathNotFound { from, to },
            other => PlanError::StateMismatch(other.to_string()),
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
