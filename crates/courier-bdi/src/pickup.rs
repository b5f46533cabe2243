//! Pickup plan: walk to the parcel, grab everything on the tile.

use async_trait::async_trait;

use courier_policy::{Predicate, PredicateKind};

use crate::context::PlanContext;
use crate::error::{PlanError, PlanResult};
use crate::intention::Intention;
use crate::plan::{refresh_partitioning, Plan};
use crate::stop::StopToken;

/// Achieves a `Pickup` predicate through a `GoTo` sub-intention followed by
/// the pickup action.  On success the carried inventory is extended and, in
/// cooperative mode, the partition owner rebroadcasts.
pub struct PickUpPlan;

impl PickUpPlan {
    pub fn is_applicable_to(kind: PredicateKind) -> bool {
        matches!(kind, PredicateKind::Pickup)
    }
}

#[async_trait]
impl Plan for PickUpPlan {
    async fn execute(
        &mut self,
        predicate: &Predicate,
        ctx:       &PlanContext,
        stop:      &StopToken,
    ) -> PlanResult<bool> {
        if predicate.parcel.is_none() {
            return Err(PlanError::StateMismatch("pickup without a target parcel".into()));
        }

        // Sub-intention: reach the parcel.  Its token is a child of ours so
        // cancelling the pickup cancels the walk.
        let walk = Intention::with_token(
            Predicate::go_to(predicate.destination),
            stop.child(),
        );
        walk.achieve(ctx).await?;

        if stop.is_stopped() {
            return Err(PlanError::Stopped);
        }
        let picked = ctx.actuator.pick_up().await?;
        if !picked.is_empty() {
            {
                let mut beliefs = ctx.lock_beliefs();
                for id in &picked {
                    beliefs.add_carried(id.clone());
                }
            }
            refresh_partitioning(ctx).await;
        }
        Ok(true)
    }
}
