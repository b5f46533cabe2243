//! Two cooperating couriers on the in-process arena.
//!
//! Runs a bounded episode on a symmetric map, then prints what each agent
//! delivered and how the generators were partitioned.
//!
//! ```text
//! cargo run -p gridworld
//! ```

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use courier_agent::{AgentMode, AgentOptions, AgentRuntime, LogLevel};
use courier_arena::Arena;
use courier_core::{GameConfig, IntervalMs, Millis};

/// Symmetric playing field: a generator and a delivery zone per side.
const MAP: &str = "P . . . . . P\n\
                   . . D . D . .\n\
                   . # . . . # .\n\
                   S . . . . . S";

const EPISODE: Duration = Duration::from_secs(30);

fn options(token: &str) -> AgentOptions {
    AgentOptions {
        api_host:          "arena:demo".into(),
        client_token:      token.into(),
        team_key:          Some("gridworld-demo".into()),
        mode:              AgentMode::CoOp,
        use_pddl:          false,
        loop_interval:     Millis(250),
        log_interval:      Millis(5_000),
        log_level:         LogLevel::Info,
        preemption_margin: 0.05,
        seed:              Some(42),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut config = GameConfig::default();
    config.movement_duration = Millis(200);
    config.parcel_decay_interval = IntervalMs::Finite(5_000);

    let (arena, starts) = match Arena::from_sketch(MAP, config) {
        Ok(built) => built,
        Err(e) => {
            eprintln!("fatal: {e}");
            return ExitCode::FAILURE;
        }
    };
    arena.scatter_parcels(10, 25);

    let Ok((events_a, actuator_a)) = arena.join("amber", "amber", starts[0]) else {
        eprintln!("fatal: could not join amber");
        return ExitCode::FAILURE;
    };
    let Ok((events_b, actuator_b)) = arena.join("basil", "basil", starts[1]) else {
        eprintln!("fatal: could not join basil");
        return ExitCode::FAILURE;
    };
    arena.start();

    let runtime_a = AgentRuntime::new(options("amber"), events_a, actuator_a);
    let runtime_b = AgentRuntime::new(options("basil"), events_b, actuator_b);
    let beliefs_a = Arc::clone(&runtime_a.beliefs);

    let session_a = tokio::spawn(runtime_a.run());
    let session_b = tokio::spawn(runtime_b.run());

    tokio::time::sleep(EPISODE).await;

    info!(
        amber = arena.score_of("amber"),
        basil = arena.score_of("basil"),
        total = arena.delivered_total(),
        "episode over"
    );
    let partitioning = beliefs_a.lock().unwrap_or_else(|p| p.into_inner());
    for (generator, owner) in partitioning.partitioning() {
        info!(%generator, %owner, "generator assignment");
    }
    drop(partitioning);

    arena.close();
    let _ = tokio::time::timeout(Duration::from_secs(5), session_a).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), session_b).await;
    ExitCode::SUCCESS
}
