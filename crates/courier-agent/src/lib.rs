//! `courier-agent` — wiring the decision core to a live session.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`options`] | `AgentOptions` — the recognised configuration file      |
//! | [`driver`]  | `AgentRuntime` — sensor loop + revision loop            |
//! | [`error`]   | `AgentError`, `AgentResult<T>`                          |
//!
//! The binary (`start-agent`) lives in `main.rs` and adds the CLI surface,
//! tracing bootstrap, and the built-in arena transport.

pub mod driver;
pub mod error;
pub mod options;


pub use driver::{run_agent, AgentRuntime};
pub use error::{AgentError, AgentResult};
pub use options::{AgentMode, AgentOptions, LogLevel};
