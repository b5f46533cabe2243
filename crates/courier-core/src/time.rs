//! Millisecond time model.
//!
//! # Design
//!
//! All decay math, occupancy forgetting, and utility formulas work in
//! milliseconds relative to an arbitrary process epoch.  `Millis` is the
//! canonical unit; a [`Clock`] captures the epoch once at startup and hands
//! out monotonic stamps.
//!
//! Every decaying read takes an explicit `now: Millis` parameter instead of
//! consulting a clock internally, so tests construct timelines directly and
//! results are exact.

use std::time::Instant;

use serde::{Deserialize, Serialize};

// ── Millis ────────────────────────────────────────────────────────────────────

/// A millisecond timestamp (relative to the process epoch) or duration.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    /// Milliseconds elapsed from `earlier` to `self`; zero if `earlier` is
    /// in the future (stamps from different sources may be slightly skewed).
    #[inline]
    pub fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Millis {
    type Output = Millis;
    #[inline]
    fn add(self, rhs: u64) -> Millis {
        Millis(self.0 + rhs)
    }
}

impl std::fmt::Display for Millis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Monotonic source of [`Millis`] stamps, anchored at construction time.
///
/// Cheap to copy; every component that needs "now" receives a copy instead
/// of reaching for a global.
#[derive(Copy, Clone, Debug)]
pub struct Clock {
    epoch: Instant,
}

impl Clock {
    /// Anchor a new clock at the current instant.
    pub fn start() -> Self {
        Self { epoch: Instant::now() }
    }

    /// Milliseconds elapsed since the epoch.
    #[inline]
    pub fn now(&self) -> Millis {
        Millis(self.epoch.elapsed().as_millis() as u64)
    }
}
