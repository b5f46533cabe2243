//! Memory entries with staleness bookkeeping.

use courier_core::{Agent, IntervalMs, Millis, Parcel};

// ── TrackedParcel ─────────────────────────────────────────────────────────────

/// A parcel as remembered by the belief set.
///
/// While a parcel is inside the sensing radius it is refreshed every frame
/// and `outdated` stays `false`.  Once it leaves the radius the last
/// observation is frozen (`last_seen`, `last_seen_reward`) and the reward is
/// decayed lazily on every read: one unit per decay interval elapsed.
#[derive(Clone, PartialEq, Debug)]
pub struct TrackedParcel {
    pub parcel: Parcel,
    /// `true` once the parcel left the sensing radius without being seen
    /// picked up or expired.
    pub outdated: bool,
    /// When the parcel was last present in a sensor frame.
    pub last_seen: Millis,
    /// Reward at `last_seen`; the base of the lazy decay.
    pub last_seen_reward: i64,
}

impl TrackedParcel {
    /// Entry for a parcel present in the current sensor frame.
    pub fn fresh(parcel: Parcel, now: Millis) -> Self {
        let last_seen_reward = parcel.reward;
        Self { parcel, outdated: false, last_seen: now, last_seen_reward }
    }

    /// The reward this parcel is believed to have at `now`.
    ///
    /// Fresh entries report the sensed reward verbatim (the sensor already
    /// applies decay server-side).  Outdated entries decay by one unit per
    /// `interval`, clamped at zero.
    pub fn believed_reward(&self, now: Millis, interval: IntervalMs) -> i64 {
        if !self.outdated {
            return self.parcel.reward;
        }
        match interval.as_millis() {
            None | Some(0) => self.last_seen_reward,
            Some(ms) => {
                let decays = (now.since(self.last_seen) / ms) as i64;
                (self.last_seen_reward - decays).max(0)
            }
        }
    }

    /// A plain [`Parcel`] snapshot with the decayed reward applied.
    pub fn snapshot(&self, now: Millis, interval: IntervalMs) -> Parcel {
        let mut parcel = self.parcel.clone();
        parcel.reward = self.believed_reward(now, interval);
        parcel
    }
}

// ── TrackedAgent ──────────────────────────────────────────────────────────────

/// Another agent as last observed, with its sighting timestamp.
#[derive(Clone, PartialEq, Debug)]
pub struct TrackedAgent {
    pub agent: Agent,
    pub last_seen: Millis,
}
