//! The option generator: turn the current beliefs into the single best
//! candidate goal, if any beats the running intention.
//!
//! Runs after every belief-changing event and on the periodic deliberation
//! tick.  Immediate opportunities (a parcel underfoot, a delivery tile
//! underfoot while loaded) short-circuit with infinite utility; everything
//! else competes on reward/time, and a candidate only displaces the current
//! intention when it clears the configured pre-emption margin.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use courier_belief::BeliefSet;
use courier_core::{Millis, TileType};
use courier_grid::astar;

use crate::predicate::Predicate;
use crate::utility::{
    closest_delivery, delivery_utility, parcel_threat, parcel_utility, ScoreContext,
};

/// Per-invocation inputs of [`next_option`].
pub struct OptionContext<'a> {
    /// `true` in cooperative mode — restricts pickups to the own partition.
    pub cooperative: bool,
    /// How much better a candidate must score to pre-empt the current
    /// intention.
    pub margin: f64,
    /// The currently committed predicate, if any.
    pub current: Option<&'a Predicate>,
    pub now: Millis,
}

/// Produce the predicate to push next, or `None` when the current intention
/// should keep running.
pub fn next_option(
    beliefs: &mut BeliefSet,
    ctx:     &OptionContext<'_>,
    rng:     &mut SmallRng,
) -> Option<Predicate> {
    let me = beliefs.self_tile()?;
    beliefs.grid()?;
    let now = ctx.now;

    // ── Immediate opportunities (infinite utility) ────────────────────────

    if let Some(under) = beliefs.parcel_at(me, now) {
        let already_targeted = ctx
            .current
            .is_some_and(|c| c.parcel.as_ref() == Some(&under.id));
        if !already_targeted {
            return Some(Predicate::pickup(me, under.id, f64::INFINITY));
        }
    }

    let carrying = beliefs.carried_count() > 0;
    if carrying
        && beliefs.grid().is_some_and(|g| g.get(me) == Some(TileType::Delivery))
        && ctx.current.map(|c| c.destination) != Some(me)
    {
        return Some(Predicate::deliver(me, f64::INFINITY));
    }

    // ── Scored candidates ─────────────────────────────────────────────────

    let blocked = beliefs.occupied_tiles(now);
    let competitors = beliefs.fresh_competitors(now);
    let my_id = beliefs.self_id()?.clone();
    let partitioning = beliefs.partitioning().clone();
    let carried_reward = beliefs.carried_reward(now);
    let carried_count = beliefs.carried_count() as i64;

    let mut candidates = beliefs.free_parcels(now);
    candidates.sort_by(|a, b| a.id.cmp(&b.id)); // stable scan order

    // Borrow the immutable pieces only after the decaying reads are done.
    let grid = beliefs.grid()?;
    let zones = beliefs.delivery_zones();
    let score = ScoreContext {
        grid,
        blocked: &blocked,
        delivery_zones: zones,
        movement_ms: beliefs.config().movement_ms(),
        decay_ms: beliefs.config().decay_ms(),
        carried_reward,
        carried_count,
    };

    let mut best: Option<Predicate> = None;
    for parcel in &candidates {
        // In cooperative play parcels on a teammate's generators are theirs;
        // parcels lying outside any assigned generator are fair game.
        if ctx.cooperative
            && let Some(owner) = partitioning.get(&parcel.pos())
            && *owner != my_id
        {
            continue;
        }
        let threat = parcel_threat(grid, &blocked, parcel, &competitors);
        let utility = parcel_utility(&score, me, parcel, threat);
        if utility > 0.0
            && best.as_ref().is_none_or(|b| utility > b.utility)
        {
            best = Some(Predicate::pickup(parcel.pos(), parcel.id.clone(), utility));
        }
    }

    if carrying {
        let utility = delivery_utility(&score, me);
        if utility > 0.0
            && best.as_ref().is_none_or(|b| utility > b.utility)
            && let Some((zone, _)) = closest_delivery(grid, &blocked, me, zones)
        {
            best = Some(Predicate::deliver(zone, utility));
        }
    }

    // ── Fallback: explore an assigned generator ───────────────────────────

    let Some(best) = best else {
        if ctx.current.is_some() {
            return None;
        }
        let reachable: Vec<_> = beliefs
            .my_generators()
            .into_iter()
            .filter(|&g| g != me)
            .filter(|&g| astar::distance(grid, &blocked, me, g).is_some())
            .collect();
        return reachable.choose(rng).map(|&g| Predicate::exploration(g));
    };

    // ── Pre-emption gate ──────────────────────────────────────────────────

    match ctx.current {
        None => Some(best),
        // Re-proposing the running goal with a refreshed score is noise.
        Some(current) if best.same_goal(current) => None,
        Some(current) if best.utility > current.utility + ctx.margin => Some(best),
        Some(_) => None,
    }
}
