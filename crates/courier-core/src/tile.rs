//! Tile classification and the canonical wire encoding.
//!
//! The simulator family has two historical tile dialects.  This crate
//! implements the canonical one:
//!
//! | Wire value | Tile              |
//! |------------|-------------------|
//! | `0`        | `NonWalkable`     |
//! | `1`        | `ParcelGenerator` |
//! | `2`        | `Delivery`        |
//! | `3`        | `Walkable`        |
//!
//! The legacy dialect (`1 = Walkable`, `2 = Delivery`, everything else
//! blocked) is a subset of older map files and is **not** decoded here; a
//! transport adapter speaking it must translate before handing tiles to the
//! core.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ── TileType ──────────────────────────────────────────────────────────────────

/// What a grid tile is.  Generators and delivery zones are walkable.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum TileType {
    NonWalkable,
    ParcelGenerator,
    Delivery,
    Walkable,
}

impl TileType {
    /// Decode the canonical wire value.
    pub fn from_wire(value: u32) -> Result<TileType, CoreError> {
        match value {
            0 => Ok(TileType::NonWalkable),
            1 => Ok(TileType::ParcelGenerator),
            2 => Ok(TileType::Delivery),
            3 => Ok(TileType::Walkable),
            other => Err(CoreError::Parse(format!("unknown tile type {other}"))),
        }
    }

    /// The canonical wire value (inverse of [`from_wire`][Self::from_wire]).
    #[inline]
    pub fn wire_value(self) -> u32 {
        match self {
            TileType::NonWalkable => 0,
            TileType::ParcelGenerator => 1,
            TileType::Delivery => 2,
            TileType::Walkable => 3,
        }
    }

    /// `true` for every tile an agent may stand on.
    #[inline]
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileType::NonWalkable)
    }
}

// ── TileSpec ──────────────────────────────────────────────────────────────────

/// One tile as announced by the map sensor event: a coordinate plus the raw
/// wire type value.  Tiles absent from the announcement are non-walkable
/// holes.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TileSpec {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: u32,
}
