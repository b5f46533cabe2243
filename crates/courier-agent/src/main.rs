//! `start-agent` — run the courier agent against a configured transport.
//!
//! ```text
//! start-agent --config agent.json
//! ```
//!
//! The only transport bundled here is the in-process arena
//! (`API_HOST = "arena:default"` or `"arena:<map-file>"`), which exists for
//! development and demos.  Socket transports implement the
//! `courier-net` contracts in their own crate and ship their own binary.
//!
//! Exit status: 0 on clean shutdown, 1 on fatal error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use courier_agent::{run_agent, AgentError, AgentOptions, AgentResult};
use courier_arena::Arena;
use courier_core::GameConfig;

/// Built-in development map: two generators, one delivery row.
const DEFAULT_MAP: &str = "P . . . P\n\
                           . . # . .\n\
                           S . D . .";

#[derive(Parser)]
#[command(name = "start-agent", about = "Run the courier decision core")]
struct Cli {
    /// Path to the JSON options file.
    #[arg(long, value_name = "PATH")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AgentResult<()> {
    let options = AgentOptions::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(options.log_level.as_filter())),
        )
        .init();

    if options.use_pddl {
        warn!("usePddl is set but no solver back-end is bundled; using grid search");
    }

    let Some(map_ref) = options.api_host.strip_prefix("arena:") else {
        return Err(AgentError::Options(format!(
            "no built-in transport for {:?}; socket clients ship separately",
            options.api_host
        )));
    };
    let sketch = if map_ref == "default" {
        DEFAULT_MAP.to_owned()
    } else {
        std::fs::read_to_string(map_ref)?
    };

    let (arena, starts) = Arena::from_sketch(&sketch, GameConfig::default())
        .map_err(|e| AgentError::Options(e.to_string()))?;
    let start = starts
        .first()
        .copied()
        .ok_or_else(|| AgentError::Options("map has no start tile (S)".into()))?;

    let (events, actuator) = arena
        .join(&options.client_token, "courier", start)
        .map_err(|e| AgentError::Options(e.to_string()))?;
    arena.scatter_parcels(8, i64::from(GameConfig::default().parcel_reward_avg));
    arena.start();
    info!(start = %start, "arena session up");

    tokio::select! {
        result = run_agent(options, events, actuator) => result,
        _ = tokio::signal::ctrl_c() => {
            info!(delivered = arena.delivered_total(), "interrupted");
            arena.close();
            Ok(())
        }
    }
}
