//! Sensed world entities: agents and parcels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::point::Point;

// ── Ids ───────────────────────────────────────────────────────────────────────

/// Opaque server-assigned agent identifier.
///
/// Ids are compared lexicographically where an ordering is needed (e.g. the
/// handshake initiator election).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

/// Opaque server-assigned parcel identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(pub String);

impl AgentId {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ParcelId {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        AgentId(s.to_owned())
    }
}

impl From<&str> for ParcelId {
    fn from(s: &str) -> Self {
        ParcelId(s.to_owned())
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ParcelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// Threshold below which a float coordinate counts as integral.  Sensor
/// frames carry accumulated float error, so an exact `fract() == 0` test
/// misclassifies settled agents as moving.
const FRACT_EPSILON: f64 = 1e-6;

/// A sensed agent (self, teammate, or competitor).
///
/// Positions are fractional while the agent is mid-step: the simulator
/// interpolates between tiles, and the fractional part doubles as a motion
/// signal (see [`Agent::heading`]).
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub score: i64,
    /// Reported by some server builds; semantics undocumented upstream.
    /// Carried through verbatim, never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty: Option<f64>,
}

impl Agent {
    /// The tile the agent logically occupies: fractional coordinates rounded
    /// to the nearest integer.
    #[inline]
    pub fn tile(&self) -> Point {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }

    /// `true` while either coordinate has a non-zero fractional part — the
    /// protocol's way of saying "movement in progress".
    pub fn is_moving(&self) -> bool {
        fract(self.x) || fract(self.y)
    }

    /// Direction of in-progress movement, decoded from the fractional-part
    /// polarity convention: a fraction above one half means the agent is
    /// heading toward the next higher tile, below one half toward the lower.
    ///
    /// Returns `None` for stationary agents.
    pub fn heading(&self) -> Option<(i32, i32)> {
        if !self.is_moving() {
            return None;
        }
        Some((axis_heading(self.x), axis_heading(self.y)))
    }
}

#[inline]
fn fract(v: f64) -> bool {
    let f = v - v.floor();
    f > FRACT_EPSILON && f < 1.0 - FRACT_EPSILON
}

fn axis_heading(v: f64) -> i32 {
    let f = v - v.floor();
    if !(f > FRACT_EPSILON && f < 1.0 - FRACT_EPSILON) {
        0
    } else if f > 0.5 {
        1
    } else {
        -1
    }
}

// ── Parcel ────────────────────────────────────────────────────────────────────

/// A sensed parcel.  `carried_by` is set when another agent (or this one)
/// holds the parcel; carried parcels move with their carrier and cannot be
/// picked up.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub id: ParcelId,
    pub x: i32,
    pub y: i32,
    pub reward: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carried_by: Option<AgentId>,
}

impl Parcel {
    /// The tile the parcel lies on.
    #[inline]
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// `true` if no agent currently holds this parcel.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.carried_by.is_none()
    }
}
