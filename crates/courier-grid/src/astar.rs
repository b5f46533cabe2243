//! A* search over the tile grid with a dynamic obstacle set.
//!
//! # Cost model
//!
//! Every step costs 1; the heuristic is Manhattan distance, which is
//! admissible and consistent on a 4-connected unit-cost grid, so the first
//! time the goal is popped the path is optimal.
//!
//! # Determinism
//!
//! Two layers of tie-breaking keep results reproducible:
//! - the open heap orders by `(f, sequence)` where `sequence` is a monotone
//!   push counter, so equal-`f` entries pop in insertion order;
//! - neighbours expand in the fixed [`Move::ALL`] order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use courier_core::{Move, Point};

use crate::error::{GridError, GridResult};
use crate::grid::Grid;

/// How many Manhattan-ranked point pairs the [`longest_path`] probe
/// evaluates with a full search.
const PROBE_PAIRS: usize = 10;

// ── Path ──────────────────────────────────────────────────────────────────────

/// The result of a path query: the move sequence and its cost (number of
/// steps — equal to `moves.len()`).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Path {
    pub moves: Vec<Move>,
    pub cost:  u32,
}

impl Path {
    /// The zero-length path returned when start and goal coincide.
    pub fn empty() -> Self {
        Self { moves: Vec::new(), cost: 0 }
    }
}

// ── find_path ─────────────────────────────────────────────────────────────────

/// A* from `start` to `goal`.
///
/// `blocked` is the dynamic obstacle set — tiles currently hosting other
/// agents.  Both endpoints must be walkable and unblocked, otherwise the
/// query fails with [`GridError::PathNotFound`].  `start == goal` yields an
/// empty path of cost 0.
pub fn find_path(
    grid:    &Grid,
    blocked: &FxHashSet<Point>,
    start:   Point,
    goal:    Point,
) -> GridResult<Path> {
    let unreachable = || GridError::PathNotFound { from: start, to: goal };

    if !grid.is_walkable(start)
        || !grid.is_walkable(goal)
        || blocked.contains(&start)
        || blocked.contains(&goal)
    {
        return Err(unreachable());
    }
    if start == goal {
        return Ok(Path::empty());
    }

    // g[p] = best known cost to reach p.
    let mut g: FxHashMap<Point, u32> = FxHashMap::default();
    // came_from[p] = (predecessor, move that entered p).
    let mut came_from: FxHashMap<Point, (Point, Move)> = FxHashMap::default();

    // Min-heap of Reverse((f, sequence, point, g_at_push)).
    let mut open: BinaryHeap<Reverse<(u32, u64, Point, u32)>> = BinaryHeap::new();
    let mut sequence: u64 = 0;

    g.insert(start, 0);
    open.push(Reverse((start.manhattan(goal), sequence, start, 0)));

    while let Some(Reverse((_, _, node, node_g))) = open.pop() {
        if node == goal {
            return Ok(reconstruct(&came_from, start, goal, node_g));
        }
        // Skip stale heap entries.
        if node_g > g[&node] {
            continue;
        }

        for mv in Move::ALL {
            let next = node.step(mv);
            if !grid.is_walkable(next) || blocked.contains(&next) {
                continue;
            }
            let next_g = node_g + 1;
            if next_g < g.get(&next).copied().unwrap_or(u32::MAX) {
                g.insert(next, next_g);
                came_from.insert(next, (node, mv));
                sequence += 1;
                open.push(Reverse((next_g + next.manhattan(goal), sequence, next, next_g)));
            }
        }
    }

    Err(unreachable())
}

fn reconstruct(
    came_from: &FxHashMap<Point, (Point, Move)>,
    start:     Point,
    goal:      Point,
    cost:      u32,
) -> Path {
    let mut moves = Vec::with_capacity(cost as usize);
    let mut cursor = goal;
    while cursor != start {
        let (prev, mv) = came_from[&cursor];
        moves.push(mv);
        cursor = prev;
    }
    moves.reverse();
    Path { moves, cost }
}

/// Path cost from `a` to `b`, or `None` when unreachable.  Convenience for
/// the scoring code, which only cares about distances.
#[inline]
pub fn distance(grid: &Grid, blocked: &FxHashSet<Point>, a: Point, b: Point) -> Option<u32> {
    find_path(grid, blocked, a, b).ok().map(|p| p.cost)
}

// ── longest_path ──────────────────────────────────────────────────────────────

/// Probe the maximal shortest-path cost between strategic points (parcel
/// generators and delivery zones).  Used to size time-based caches such as
/// the occupancy forgetting window.
///
/// Evaluating every pair is quadratic in A* runs, so pairs are pre-ranked by
/// Manhattan distance (a lower bound on path cost) and only the top
/// [`PROBE_PAIRS`] candidates get a full search.  Obstacle-free query: the
/// probe describes the map, not the current traffic.
pub fn longest_path(grid: &Grid, points: &[Point]) -> u32 {
    let mut pairs: Vec<(u32, Point, Point)> = Vec::new();
    for (i, &a) in points.iter().enumerate() {
        for &b in &points[i + 1..] {
            pairs.push((a.manhattan(b), a, b));
        }
    }
    pairs.sort_by(|x, y| y.0.cmp(&x.0));

    let no_obstacles = FxHashSet::default();
    pairs
        .iter()
        .take(PROBE_PAIRS)
        .filter_map(|&(_, a, b)| distance(grid, &no_obstacles, a, b))
        .max()
        .unwrap_or(0)
}
