//! Delivery plan: walk to the delivery zone, put everything down.

use async_trait::async_trait;

use courier_policy::{Predicate, PredicateKind};

use crate::context::PlanContext;
use crate::error::{PlanError, PlanResult};
use crate::intention::Intention;
use crate::plan::{refresh_partitioning, Plan};
use crate::stop::StopToken;

/// Achieves a `Deliver` predicate through a `GoTo` sub-intention followed
/// by the drop action.  On success the carried inventory is cleared and, in
/// cooperative mode, the partition owner rebroadcasts.
pub struct DeliverPlan;

impl DeliverPlan {
    pub fn is_applicable_to(kind: PredicateKind) -> bool {
        matches!(kind, PredicateKind::Deliver)
    }
}

#[async_trait]
impl Plan for DeliverPlan {
    async fn execute(
        &mut self,
        predicate: &Predicate,
        ctx:       &PlanContext,
        stop:      &StopToken,
    ) -> PlanResult<bool> {
        let walk = Intention::with_token(
            Predicate::go_to(predicate.destination),
            stop.child(),
        );
        walk.achieve(ctx).await?;

        if stop.is_stopped() {
            return Err(PlanError::Stopped);
        }
        let dropped = ctx.actuator.put_down().await?;
        if !dropped.is_empty() {
            ctx.lock_beliefs().clear_carried();
            refresh_partitioning(ctx).await;
        }
        Ok(true)
    }
}
