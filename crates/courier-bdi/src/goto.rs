//! Movement plan: path to the destination and walk it step by step.

use async_trait::async_trait;

use courier_grid::astar;
use courier_policy::{Predicate, PredicateKind};

use crate::context::PlanContext;
use crate::error::{PlanError, PlanResult};
use crate::plan::Plan;
use crate::stop::StopToken;

/// Grid-search movement: one A* query up front, then one actuator step per
/// move.  A refused step surfaces as [`PlanError::MoveFailed`] and leaves
/// re-planning to the revision loop.
pub struct GoToPlan;

impl GoToPlan {
    pub fn is_applicable_to(kind: PredicateKind) -> bool {
        matches!(kind, PredicateKind::GoTo | PredicateKind::Exploration)
    }
}

#[async_trait]
impl Plan for GoToPlan {
    async fn execute(
        &mut self,
        predicate: &Predicate,
        ctx:       &PlanContext,
        stop:      &StopToken,
    ) -> PlanResult<bool> {
        let (start, path) = {
            let mut beliefs = ctx.lock_beliefs();
            let now = ctx.clock.now();
            let Some(start) = beliefs.self_tile() else {
                return Err(PlanError::StateMismatch("own position unknown".into()));
            };
            let blocked = beliefs.occupied_tiles(now);
            let Some(grid) = beliefs.grid() else {
                return Err(PlanError::StateMismatch("map not loaded".into()));
            };
            let path = astar::find_path(grid, &blocked, start, predicate.destination)?;
            (start, path)
        };

        // Empty path: already there.
        let mut at = start;
        for direction in path.moves {
            if stop.is_stopped() {
                return Err(PlanError::Stopped);
            }
            match ctx.actuator.step(direction).await? {
                Some(position) => {
                    at = position;
                    ctx.lock_beliefs().update_self_position(position);
                }
                None => return Err(PlanError::MoveFailed { direction, at }),
            }
        }
        Ok(true)
    }
}
