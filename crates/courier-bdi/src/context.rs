//! The explicit execution context handed to every plan.
//!
//! Replaces what the original design kept as process-wide globals: the
//! belief set, the actuator, and the team link travel together in one value
//! that the driver assembles at startup.

use std::sync::{Arc, Mutex, MutexGuard};

use courier_belief::BeliefSet;
use courier_core::Clock;
use courier_net::{Actuator, TeamLink};

/// Shared handles for plan execution.  Cheap to clone.
#[derive(Clone)]
pub struct PlanContext {
    pub beliefs:     Arc<Mutex<BeliefSet>>,
    pub actuator:    Arc<dyn Actuator>,
    pub team:        Arc<TeamLink>,
    pub clock:       Clock,
    /// `true` in cooperative mode; gates the partition refresh hooks.
    pub cooperative: bool,
}

impl PlanContext {
    /// Lock the belief set.  Callers must not hold the guard across an
    /// await — belief reads happen between suspension points, never around
    /// them.
    pub fn lock_beliefs(&self) -> MutexGuard<'_, BeliefSet> {
        self.beliefs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
