//! Two-phase partitioning of parcel generators between teammates.
//!
//! 1. **Voronoi assignment** — every generator goes to the agent with the
//!    smaller A* distance; ties break toward the lexicographically smaller
//!    agent id, so both teammates compute identical maps from identical
//!    inputs.
//! 2. **Capacity rebalancing** — target capacity is `⌊G/N⌋` with the first
//!    `G mod N` agents (in id order) taking one extra.  While some agent is
//!    over capacity and another under, the single cheapest generator (by
//!    `new_distance − current_distance`) migrates.
//!
//! Distances ignore transient occupancy: partitions describe the map, not
//! the current traffic, and must be stable across frames.

use rustc_hash::{FxHashMap, FxHashSet};

use courier_core::{AgentId, Point};
use courier_grid::{astar, Grid};

/// Distance stand-in for unreachable pairs, large enough to lose every
/// comparison but safe to subtract.
const UNREACHABLE: i64 = 1 << 30;

/// Assign every generator to exactly one of `agents`.
///
/// The result is deterministic in the inputs: both teammates arrive at the
/// same map without negotiating (only the handshake initiator broadcasts it
/// anyway).  Generators unreachable by every agent are parked with the
/// first agent in id order so the map always covers the full generator set.
pub fn compute_partitioning(
    grid:       &Grid,
    generators: &[Point],
    agents:     &[(AgentId, Point)],
) -> FxHashMap<Point, AgentId> {
    let mut map = FxHashMap::default();
    if agents.is_empty() || generators.is_empty() {
        return map;
    }

    let mut ranked: Vec<(AgentId, Point)> = agents.to_vec();
    ranked.sort_by(|a, b| a.0.cmp(&b.0));
    let agent_count = ranked.len();

    // Distance matrix: dist[a][g], obstacle-free queries.
    let no_obstacles = FxHashSet::default();
    let dist: Vec<Vec<i64>> = ranked
        .iter()
        .map(|(_, pos)| {
            generators
                .iter()
                .map(|&g| {
                    astar::distance(grid, &no_obstacles, *pos, g)
                        .map_or(UNREACHABLE, |d| d as i64)
                })
                .collect()
        })
        .collect();

    // ── Phase 1: Voronoi assignment ───────────────────────────────────────
    let mut owner: Vec<usize> = (0..generators.len())
        .map(|g| {
            (0..agent_count)
                .min_by_key(|&a| (dist[a][g], a))
                .unwrap_or(0)
        })
        .collect();

    // ── Phase 2: capacity rebalancing ─────────────────────────────────────
    let base = generators.len() / agent_count;
    let extra = generators.len() % agent_count;
    let capacity: Vec<usize> = (0..agent_count)
        .map(|a| base + usize::from(a < extra))
        .collect();

    let mut counts = vec![0usize; agent_count];
    for &a in &owner {
        counts[a] += 1;
    }

    // Each round migrates exactly one generator; bounded by the total
    // imbalance, so G rounds suffice.
    for _ in 0..generators.len() {
        let Some(over) = (0..agent_count).find(|&a| counts[a] > capacity[a]) else {
            break;
        };
        let Some(under) = (0..agent_count).find(|&a| counts[a] < capacity[a]) else {
            break;
        };

        let mut best: Option<(i64, usize)> = None;
        for g in 0..generators.len() {
            if owner[g] != over {
                continue;
            }
            let cost = dist[under][g] - dist[over][g];
            if best.is_none_or(|(c, _)| cost < c) {
                best = Some((cost, g));
            }
        }
        let Some((_, g)) = best else {
            break;
        };
        owner[g] = under;
        counts[over] -= 1;
        counts[under] += 1;
    }

    for (g, &a) in owner.iter().enumerate() {
        map.insert(generators[g], ranked[a].0.clone());
    }
    map
}
