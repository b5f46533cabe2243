//! Game configuration as announced by the simulator at session start.
//!
//! # Interval encoding
//!
//! Interval-valued fields arrive either as a bare millisecond number or as a
//! compact string `\d+(ms|s|m|h)?` (default unit: milliseconds), or as the
//! literal `"infinite"`.  [`IntervalMs`] decodes all three forms.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::time::Millis;

// ── IntervalMs ────────────────────────────────────────────────────────────────

/// A configured interval: a finite number of milliseconds or `infinite`
/// (the associated mechanism is disabled).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum IntervalMs {
    Finite(u64),
    Infinite,
}

impl IntervalMs {
    /// Parse the compact wire encoding.
    pub fn parse(text: &str) -> Result<IntervalMs, CoreError> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("infinite") {
            return Ok(IntervalMs::Infinite);
        }
        let digits_end = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (digits, unit) = text.split_at(digits_end);
        if digits.is_empty() {
            return Err(CoreError::Parse(format!("bad interval {text:?}")));
        }
        let value: u64 = digits
            .parse()
            .map_err(|e| CoreError::Parse(format!("bad interval {text:?}: {e}")))?;
        let scale = match unit {
            "" | "ms" => 1,
            "s" => 1_000,
            "m" => 60_000,
            "h" => 3_600_000,
            other => {
                return Err(CoreError::Parse(format!("bad interval unit {other:?}")));
            }
        };
        Ok(IntervalMs::Finite(value * scale))
    }

    /// The interval in milliseconds, or `None` when infinite.
    #[inline]
    pub fn as_millis(self) -> Option<u64> {
        match self {
            IntervalMs::Finite(ms) => Some(ms),
            IntervalMs::Infinite => None,
        }
    }

    #[inline]
    pub fn is_infinite(self) -> bool {
        matches!(self, IntervalMs::Infinite)
    }
}

impl<'de> Deserialize<'de> for IntervalMs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(ms) => Ok(IntervalMs::Finite(ms)),
            Raw::Text(s) => IntervalMs::parse(&s).map_err(D::Error::custom),
        }
    }
}

impl Serialize for IntervalMs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IntervalMs::Finite(ms) => serializer.serialize_u64(*ms),
            IntervalMs::Infinite => serializer.serialize_str("infinite"),
        }
    }
}

/// Deserialize a mandatory-finite duration field that may use the compact
/// interval encoding.
fn de_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Millis, D::Error> {
    match IntervalMs::deserialize(deserializer)? {
        IntervalMs::Finite(ms) => Ok(Millis(ms)),
        IntervalMs::Infinite => Err(D::Error::custom("duration cannot be infinite")),
    }
}

// ── GameConfig ────────────────────────────────────────────────────────────────

/// Game parameters, delivered once per session by the config sensor event.
///
/// Unknown fields are ignored; missing fields take the defaults below so a
/// partially configured local arena still produces a usable config.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    #[serde(rename = "MAP_FILE")]
    pub map_file: String,

    #[serde(rename = "PARCELS_GENERATION_INTERVAL")]
    pub parcels_generation_interval: IntervalMs,

    #[serde(rename = "PARCELS_MAX")]
    pub parcels_max: u32,

    #[serde(rename = "MOVEMENT_STEPS")]
    pub movement_steps: u32,

    /// Milliseconds one actuator step takes — the `M` of every utility
    /// formula.
    #[serde(rename = "MOVEMENT_DURATION", deserialize_with = "de_duration")]
    pub movement_duration: Millis,

    #[serde(rename = "AGENTS_OBSERVATION_DISTANCE")]
    pub agents_observation_distance: u32,

    #[serde(rename = "PARCELS_OBSERVATION_DISTANCE")]
    pub parcels_observation_distance: u32,

    #[serde(rename = "AGENT_TIMEOUT", deserialize_with = "de_duration")]
    pub agent_timeout: Millis,

    #[serde(rename = "PARCEL_REWARD_AVG")]
    pub parcel_reward_avg: u32,

    #[serde(rename = "PARCEL_REWARD_VARIANCE")]
    pub parcel_reward_variance: u32,

    /// Reward decay period — the `I` of every utility formula.  `infinite`
    /// disables decay entirely.
    #[serde(rename = "PARCEL_DECADING_INTERVAL")]
    pub parcel_decay_interval: IntervalMs,

    #[serde(rename = "RANDOMLY_MOVING_AGENTS")]
    pub randomly_moving_agents: u32,

    #[serde(rename = "AGENT_SPEED")]
    pub agent_speed: f64,

    /// Simulator frame interval.
    #[serde(rename = "CLOCK")]
    pub clock: IntervalMs,
}

impl GameConfig {
    /// `MOVEMENT_DURATION` in raw milliseconds.
    #[inline]
    pub fn movement_ms(&self) -> u64 {
        self.movement_duration.0
    }

    /// `PARCEL_DECADING_INTERVAL` in milliseconds, `None` when decay is off.
    #[inline]
    pub fn decay_ms(&self) -> Option<u64> {
        self.parcel_decay_interval.as_millis()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_file: String::from("default_map"),
            parcels_generation_interval: IntervalMs::Finite(2_000),
            parcels_max: 10,
            movement_steps: 1,
            movement_duration: Millis(500),
            agents_observation_distance: 10,
            parcels_observation_distance: 10,
            agent_timeout: Millis(10_000),
            parcel_reward_avg: 30,
            parcel_reward_variance: 10,
            parcel_decay_interval: IntervalMs::Finite(1_000),
            randomly_moving_agents: 0,
            agent_speed: 1.0,
            clock: IntervalMs::Finite(50),
        }
    }
}
