//! `courier-policy` — deciding what is worth doing.
//!
//! # Crate layout
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`predicate`] | `Predicate`, `PredicateKind` — typed goals            |
//! | [`utility`]   | reward/time scoring, threat model, delivery lookup    |
//! | [`partition`] | Voronoi assignment + capacity rebalancing             |
//! | [`options`]   | the option generator (beliefs → best candidate goal)  |
//!
//! Everything here is a pure function of a belief snapshot; nothing talks
//! to the network or the actuator.

pub mod options;
pub mod partition;
pub mod predicate;
pub mod utility;

#[cfg(test)]
mod tests;

pub use options::{next_option, OptionContext};
pub use partition::compute_partitioning;
pub use predicate::{Predicate, PredicateKind};
pub use utility::{closest_delivery, delivery_utility, parcel_threat, parcel_utility, ScoreContext};
