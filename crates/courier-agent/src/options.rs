//! The agent options file.
//!
//! Loaded from the JSON path given to `start-agent --config`.  Key names
//! follow the conventions of the simulator ecosystem (upper-snake for
//! connection material, camelCase for tunables).

use std::path::Path;

use serde::Deserialize;

use courier_core::Millis;

use crate::error::{AgentError, AgentResult};

fn default_loop_interval() -> Millis {
    Millis(1_000)
}

fn default_log_interval() -> Millis {
    Millis(5_000)
}

fn default_margin() -> f64 {
    0.05
}

// ── AgentMode ─────────────────────────────────────────────────────────────────

/// Solo play or a cooperating pair.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Deserialize)]
pub enum AgentMode {
    #[default]
    SingleAgent,
    CoOp,
}

// ── LogLevel ──────────────────────────────────────────────────────────────────

/// Log verbosity, mapped onto a tracing env-filter directive.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

// ── AgentOptions ──────────────────────────────────────────────────────────────

/// Everything `start-agent` reads from its config file.
#[derive(Clone, Debug, Deserialize)]
pub struct AgentOptions {
    /// Simulator endpoint.  The built-in transport understands
    /// `arena:default` and `arena:<map-file>`; socket schemes belong to an
    /// external client crate.
    #[serde(rename = "API_HOST")]
    pub api_host: String,

    /// Identity token; doubles as the agent id on the arena transport.
    #[serde(rename = "CLIENT_TOKEN")]
    pub client_token: String,

    /// Shared secret of the cooperating pair.  Required in `CoOp` mode.
    #[serde(rename = "TEAM_KEY", default)]
    pub team_key: Option<String>,

    #[serde(default)]
    pub mode: AgentMode,

    /// Recognised for compatibility; the offline solver back-end is not
    /// bundled, so enabling it only logs a warning.
    #[serde(rename = "usePddl", default)]
    pub use_pddl: bool,

    /// Fallback deliberation period.
    #[serde(rename = "loopInterval", default = "default_loop_interval")]
    pub loop_interval: Millis,

    /// Status line period.
    #[serde(rename = "logInterval", default = "default_log_interval")]
    pub log_interval: Millis,

    #[serde(rename = "logLevel", default)]
    pub log_level: LogLevel,

    /// How much better (reward/s) a candidate must score to pre-empt the
    /// current intention.
    #[serde(rename = "preemptionMargin", default = "default_margin")]
    pub preemption_margin: f64,

    /// Deterministic seed for the exploration RNG; absent → entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl AgentOptions {
    /// Read and validate an options file.
    pub fn load(path: &Path) -> AgentResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let options: AgentOptions = serde_json::from_str(&text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> AgentResult<()> {
        if self.client_token.is_empty() {
            return Err(AgentError::Options("CLIENT_TOKEN must not be empty".into()));
        }
        if self.cooperative() && self.team_key.as_deref().unwrap_or("").is_empty() {
            return Err(AgentError::Options("CoOp mode requires a TEAM_KEY".into()));
        }
        if self.preemption_margin < 0.0 {
            return Err(AgentError::Options("preemptionMargin must be >= 0".into()));
        }
        Ok(())
    }

    pub fn cooperative(&self) -> bool {
        self.mode == AgentMode::CoOp
    }
}
