//! The `Plan` trait and the library that maps predicates to plans.

use async_trait::async_trait;
use tracing::warn;

use courier_policy::{compute_partitioning, Predicate, PredicateKind};

use crate::context::PlanContext;
use crate::deliver::DeliverPlan;
use crate::error::PlanResult;
use crate::goto::GoToPlan;
use crate::pickup::PickUpPlan;
use crate::stop::StopToken;

// ── Plan trait ────────────────────────────────────────────────────────────────

/// One way of achieving a predicate.
///
/// A plan instance is built fresh for every execution attempt, runs to
/// completion or error, and is discarded.  Implementations must observe
/// `stop` before every suspension point and fail with
/// [`PlanError::Stopped`][crate::PlanError::Stopped] when it is raised.
#[async_trait]
pub trait Plan: Send {
    async fn execute(
        &mut self,
        predicate: &Predicate,
        ctx:       &PlanContext,
        stop:      &StopToken,
    ) -> PlanResult<bool>;
}

// ── Library ───────────────────────────────────────────────────────────────────

/// A library entry: the applicability test plus a constructor.
pub struct PlanEntry {
    pub name:       &'static str,
    pub applicable: fn(PredicateKind) -> bool,
    pub build:      fn() -> Box<dyn Plan>,
}

fn build_go_to() -> Box<dyn Plan> {
    Box::new(GoToPlan)
}

fn build_pick_up() -> Box<dyn Plan> {
    Box::new(PickUpPlan)
}

fn build_deliver() -> Box<dyn Plan> {
    Box::new(DeliverPlan)
}

static LIBRARY: [PlanEntry; 3] = [
    PlanEntry {
        name:       "pick_up",
        applicable: PickUpPlan::is_applicable_to,
        build:      build_pick_up,
    },
    PlanEntry {
        name:       "deliver",
        applicable: DeliverPlan::is_applicable_to,
        build:      build_deliver,
    },
    PlanEntry {
        name:       "go_to",
        applicable: GoToPlan::is_applicable_to,
        build:      build_go_to,
    },
];

/// The plans available to [`Intention::achieve`][crate::Intention::achieve],
/// tried in order of appearance.
pub fn library() -> &'static [PlanEntry] {
    &LIBRARY
}

// ── Shared partition hook ─────────────────────────────────────────────────────

/// Recompute the generator partitioning and broadcast it.  Called by the
/// pickup/delivery plans after success and by the driver's periodic
/// rebroadcast; only effective on the handshake initiator in cooperative
/// mode.  Failures are logged, never fatal.
pub async fn refresh_partitioning(ctx: &PlanContext) {
    if !ctx.cooperative || !ctx.team.initiated_handshake() {
        return;
    }
    let map = {
        let beliefs = ctx.lock_beliefs();
        let Some(grid) = beliefs.grid() else { return };
        let Some(me_id) = beliefs.self_id() else { return };
        let Some(me_tile) = beliefs.self_tile() else { return };
        let Some(mate) = beliefs.teammate() else { return };
        compute_partitioning(
            grid,
            beliefs.generators(),
            &[(me_id.clone(), me_tile), (mate.id.clone(), mate.tile())],
        )
    };
    ctx.lock_beliefs().set_partitioning(map.clone());
    if let Err(e) = ctx.team.share_partitioning(&map).await {
        warn!(error = %e, "partition broadcast failed");
    }
}
