//! Reward/time scoring of candidate actions.
//!
//! # Units
//!
//! Every utility is **reward per second**: expected delivered reward
//! divided by the time the action chain takes.  Path costs come from A*
//! (steps), times from `steps × MOVEMENT_DURATION`, and decay losses from
//! `PARCEL_DECADING_INTERVAL`.  Unreachable targets score `−∞` so they lose
//! against every reachable option and against "do nothing" (0).  The
//! pre-emption margin from the agent options is an absolute delta in the
//! same unit.

use rustc_hash::FxHashSet;

use courier_core::{Agent, Parcel, Point};
use courier_grid::{astar, Grid};

/// Weight of raw proximity in the threat model.
const THREAT_PROXIMITY_WEIGHT: f64 = 0.3;
/// Weight of the directed-motion term in the threat model.
const THREAT_HEADING_WEIGHT: f64 = 0.7;

// ── ScoreContext ──────────────────────────────────────────────────────────────

/// Everything the scoring formulas need from the current belief snapshot.
#[derive(Copy, Clone)]
pub struct ScoreContext<'a> {
    pub grid:           &'a Grid,
    /// Tiles currently hosting other agents.
    pub blocked:        &'a FxHashSet<Point>,
    pub delivery_zones: &'a [Point],
    /// Milliseconds per step (`M`).
    pub movement_ms:    u64,
    /// Reward decay period in milliseconds (`I`); `None` disables decay.
    pub decay_ms:       Option<u64>,
    /// Sum of rewards currently carried (`C`).
    pub carried_reward: i64,
    /// Number of parcels currently carried (`n`).
    pub carried_count:  i64,
}

impl ScoreContext<'_> {
    /// How many decay ticks elapse over `t` milliseconds (ceiling).
    fn decays_over(&self, t: u64) -> i64 {
        match self.decay_ms {
            None | Some(0) => 0,
            Some(i) => (t.div_ceil(i)) as i64,
        }
    }
}

// ── Delivery lookup ───────────────────────────────────────────────────────────

/// The delivery zone with the cheapest path from `from`, with its step cost.
/// `None` when no zone is reachable.
pub fn closest_delivery(
    grid:    &Grid,
    blocked: &FxHashSet<Point>,
    from:    Point,
    zones:   &[Point],
) -> Option<(Point, u32)> {
    zones
        .iter()
        .filter_map(|&zone| astar::distance(grid, blocked, from, zone).map(|d| (zone, d)))
        .min_by_key(|&(_, d)| d)
}

// ── Utilities ─────────────────────────────────────────────────────────────────

/// Score picking up `parcel` from `from` and then delivering everything.
///
/// `threat` is the adversarial penalty from [`parcel_threat`], pre-computed
/// by the caller so one threat evaluation can serve several formulas.
pub fn parcel_utility(ctx: &ScoreContext<'_>, from: Point, parcel: &Parcel, threat: f64) -> f64 {
    let Some(steps_pick) = astar::distance(ctx.grid, ctx.blocked, from, parcel.pos()) else {
        return f64::NEG_INFINITY;
    };
    let Some((_, steps_del)) =
        closest_delivery(ctx.grid, ctx.blocked, parcel.pos(), ctx.delivery_zones)
    else {
        return f64::NEG_INFINITY;
    };

    let t_pick = steps_pick as u64 * ctx.movement_ms;
    let t_del = steps_del as u64 * ctx.movement_ms;
    let decays_pickup = ctx.decays_over(t_pick);
    let decays_delivery = ctx.decays_over(t_del);

    let n = ctx.carried_count;
    // What the current cargo is still worth after the detour.
    let carried_final =
        (ctx.carried_reward - decays_pickup * n - decays_delivery * (n + 1)).max(0);
    // What the target parcel is worth once fetched and delivered, discounted
    // by the risk of losing the race for it.
    let target_final = (parcel.reward as f64
        - decays_pickup as f64
        - threat
        - (decays_delivery * (n + 1)) as f64)
        .max(0.0);

    let total_secs = (t_pick + t_del) as f64 / 1_000.0;
    if total_secs == 0.0 {
        return 0.0;
    }
    (carried_final as f64 + target_final) / total_secs
}

/// Score heading to the nearest delivery zone with the current cargo.
pub fn delivery_utility(ctx: &ScoreContext<'_>, from: Point) -> f64 {
    let Some((_, steps)) = closest_delivery(ctx.grid, ctx.blocked, from, ctx.delivery_zones)
    else {
        return f64::NEG_INFINITY;
    };
    let t = steps as u64 * ctx.movement_ms;
    if t == 0 {
        return 0.0;
    }
    let final_reward = (ctx.carried_reward - ctx.decays_over(t) * ctx.carried_count).max(0);
    final_reward as f64 / (t as f64 / 1_000.0)
}

// ── Threat ────────────────────────────────────────────────────────────────────

/// Adversarial penalty for `parcel`: how likely a competitor beats us to it.
///
/// Each competitor at path distance `d ≥ 1` contributes
/// `proximity = reward / d²`, weighted 0.3 — plus, when the competitor is
/// visibly moving *toward* the parcel, up to 0.7 more scaled by how aligned
/// its heading is with the parcel direction.  Each competitor's own tile is
/// exempted from the obstacle set for its distance query.
pub fn parcel_threat(
    grid:        &Grid,
    occupied:    &FxHashSet<Point>,
    parcel:      &Parcel,
    competitors: &[Agent],
) -> f64 {
    let mut threat = 0.0;
    for rival in competitors {
        let tile = rival.tile();
        let mut view = occupied.clone();
        view.remove(&tile);
        let Some(d) = astar::distance(grid, &view, tile, parcel.pos()) else {
            continue;
        };
        if d < 1 {
            continue;
        }
        let proximity = parcel.reward as f64 / (d as f64 * d as f64);
        threat += proximity * THREAT_PROXIMITY_WEIGHT;

        if let Some((hx, hy)) = rival.heading() {
            let wx = parcel.x as f64 - rival.x;
            let wy = parcel.y as f64 - rival.y;
            let alignment = hx as f64 * wx + hy as f64 * wy;
            let reach = (wx * wx + wy * wy).sqrt();
            if alignment > 0.0 && reach > 0.0 {
                threat += proximity * THREAT_HEADING_WEIGHT * alignment / reach;
            }
        }
    }
    threat
}
