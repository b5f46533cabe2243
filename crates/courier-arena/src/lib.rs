//! `courier-arena` — a deterministic in-process grid world.
//!
//! The arena implements both agent-facing contracts of `courier-net` — it
//! feeds [`SensorEvent`]s and answers [`Actuator`] calls — for up to a
//! handful of agents sharing one process.  It exists for two consumers:
//!
//! - the end-to-end tests of `courier-agent`, which script parcel spawns
//!   and assert on the recorded action log;
//! - the `gridworld` demo, which runs a cooperating pair live.
//!
//! # Fidelity notes
//!
//! - Movement is tile-quantized: a step takes `MOVEMENT_DURATION` and
//!   either lands (new position) or is refused (target blocked or
//!   occupied).  Fractional in-transit positions are not simulated.
//! - Sensing uses Manhattan radii.
//! - Parcel rewards decay by one unit per `PARCEL_DECADING_INTERVAL` from
//!   spawn time; free parcels vanish at zero.
//! - `say`/`shout`/`ask` form a lossless local bus between joined agents.
//!
//! [`SensorEvent`]: courier_net::SensorEvent
//! [`Actuator`]: courier_net::Actuator

pub mod arena;
pub mod error;

#[cfg(test)]
mod tests;

pub use arena::{Arena, ParcelSpawn};
pub use error::{ArenaError, ArenaResult};
