//! `courier-core` — foundational types for the courier agent workspace.
//!
//! This crate is a dependency of every other `courier-*` crate.  It
//! intentionally has no `courier-*` dependencies and minimal external ones
//! (only `serde` and `thiserror`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                |
//! |------------|---------------------------------------------------------|
//! | [`point`]  | `Point`, `Move` — grid coordinates and primitive steps  |
//! | [`tile`]   | `TileType`, `TileSpec` — tile classification & decoding |
//! | [`entity`] | `AgentId`, `ParcelId`, `Agent`, `Parcel`                |
//! | [`time`]   | `Millis`, `Clock` — millisecond time model              |
//! | [`config`] | `GameConfig`, `IntervalMs` — game parameters            |
//! | [`error`]  | `CoreError`, `CoreResult`                               |

pub mod config;
pub mod entity;
pub mod error;
pub mod point;
pub mod tile;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{GameConfig, IntervalMs};
pub use entity::{Agent, AgentId, Parcel, ParcelId};
pub use error::{CoreError, CoreResult};
pub use point::{Move, Point};
pub use tile::{TileSpec, TileType};
pub use time::{Clock, Millis};
