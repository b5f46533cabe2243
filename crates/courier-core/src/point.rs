//! Integer grid coordinates and the four primitive moves.
//!
//! The coordinate system matches the simulator's: `x` grows to the right,
//! `y` grows **upward**, so `Move::Up` is `y + 1` and `Move::Down` is
//! `y - 1`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ── Point ─────────────────────────────────────────────────────────────────────

/// A tile coordinate.  Entities with in-progress movement report fractional
/// positions; those are rounded to the nearest `Point` before any grid query
/// (see [`Agent::tile`][crate::Agent::tile]).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (L1) distance — the admissible heuristic for unit-cost
    /// 4-connected grids.
    #[inline]
    pub fn manhattan(self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The tile one step in direction `m`.
    #[inline]
    pub fn step(self, m: Move) -> Point {
        let (dx, dy) = m.delta();
        Point::new(self.x + dx, self.y + dy)
    }

    /// Wire key used by the partition map serialization: `"x,y"`.
    pub fn key(self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// Parse a `"x,y"` wire key back into a `Point`.
    pub fn from_key(key: &str) -> Result<Point, CoreError> {
        let (x, y) = key
            .split_once(',')
            .ok_or_else(|| CoreError::Parse(format!("bad point key {key:?}")))?;
        let parse = |s: &str| {
            s.trim()
                .parse::<i32>()
                .map_err(|e| CoreError::Parse(format!("bad point key {key:?}: {e}")))
        };
        Ok(Point::new(parse(x)?, parse(y)?))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Move ──────────────────────────────────────────────────────────────────────

/// One primitive actuator step.  Serialized with the simulator's lowercase
/// direction names (`"up"`, `"down"`, `"left"`, `"right"`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All moves in the fixed neighbour-expansion order used by the
    /// pathfinder.  The order is part of the tie-break contract: with equal
    /// path costs, the first expansion wins.
    pub const ALL: [Move; 4] = [Move::Up, Move::Right, Move::Down, Move::Left];

    /// `(dx, dy)` displacement of this move.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Move::Up => (0, 1),
            Move::Down => (0, -1),
            Move::Left => (-1, 0),
            Move::Right => (1, 0),
        }
    }

    /// The move leading from `from` to an adjacent tile `to`, or `None` if
    /// the tiles are not 4-adjacent.
    pub fn between(from: Point, to: Point) -> Option<Move> {
        Move::ALL.into_iter().find(|&m| from.step(m) == to)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        f.write_str(name)
    }
}
