//! The driver: sensor events in, belief updates and deliberation out.
//!
//! # Runtime shape
//!
//! Two cooperating futures on one (current-thread) runtime:
//!
//! - the **driver loop** consumes sensor events, mutates the belief set,
//!   relays frames to the teammate, and runs the option generator;
//! - the **revision loop** ([`IntentionQueue::run`]) executes the current
//!   intention through the plan library.
//!
//! They interleave at await points only, which gives the ordering
//! guarantee: events applied before a deliberation run are reflected in its
//! outcome, and a plan observes belief changes at its next suspension
//! point.
//!
//! [`IntentionQueue::run`]: courier_bdi::IntentionQueue

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use courier_belief::BeliefSet;
use courier_bdi::{refresh_partitioning, IntentionQueue, PlanContext};
use courier_core::{Clock, Millis};
use courier_grid::Grid;
use courier_net::{Actuator, SensorEvent, SensorRx, TeamEvent, TeamLink};
use courier_policy::{next_option, OptionContext};

use crate::error::AgentResult;
use crate::options::AgentOptions;

/// Discovery shout period while the handshake is open.
const HELLO_PERIOD: Duration = Duration::from_secs(2);
/// Periodic partition rebroadcast period (initiator only).
const PARTITION_PERIOD: Duration = Duration::from_secs(10);

// ── AgentRuntime ──────────────────────────────────────────────────────────────

/// A fully wired agent.  [`run`][Self::run] drives it until the sensor
/// stream ends; the shared handles stay observable from outside (tests, the
/// demo) through their `Arc`s.
pub struct AgentRuntime {
    pub beliefs: Arc<Mutex<BeliefSet>>,
    pub team:    Arc<TeamLink>,
    pub queue:   Arc<IntentionQueue>,
    driver:      Driver,
    plan_ctx:    PlanContext,
}

impl AgentRuntime {
    pub fn new(
        options:  AgentOptions,
        events:   SensorRx,
        actuator: Arc<dyn Actuator>,
    ) -> Self {
        let options = Arc::new(options);
        let clock = Clock::start();
        let beliefs = Arc::new(Mutex::new(BeliefSet::new()));
        let team = Arc::new(TeamLink::new(
            options.team_key.clone().unwrap_or_default(),
            Arc::clone(&actuator),
        ));
        let queue = Arc::new(IntentionQueue::new());

        let plan_ctx = PlanContext {
            beliefs:     Arc::clone(&beliefs),
            actuator,
            team:        Arc::clone(&team),
            clock,
            cooperative: options.cooperative(),
        };

        let rng = match options.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::seed_from_u64(rand::random()),
        };

        let driver = Driver {
            plan_ctx: plan_ctx.clone(),
            queue:    Arc::clone(&queue),
            options:  Arc::clone(&options),
            events,
            rng,
        };

        Self { beliefs, team, queue, driver, plan_ctx }
    }

    /// Run the driver loop and the revision loop until disconnect.
    pub async fn run(self) -> AgentResult<()> {
        let queue = Arc::clone(&self.queue);
        let plan_ctx = self.plan_ctx.clone();
        let revision = async move { queue.run(&plan_ctx).await };

        tokio::select! {
            result = self.driver.run() => result,
            () = revision => Ok(()),
        }
    }
}

/// Convenience wrapper: build a runtime and run it.
pub async fn run_agent(
    options:  AgentOptions,
    events:   SensorRx,
    actuator: Arc<dyn Actuator>,
) -> AgentResult<()> {
    AgentRuntime::new(options, events, actuator).run().await
}

// ── Driver ────────────────────────────────────────────────────────────────────

struct Driver {
    plan_ctx: PlanContext,
    queue:    Arc<IntentionQueue>,
    options:  Arc<AgentOptions>,
    events:   SensorRx,
    rng:      SmallRng,
}

impl Driver {
    async fn run(mut self) -> AgentResult<()> {
        let mut hello = interval(HELLO_PERIOD);
        let mut partition = interval(PARTITION_PERIOD);
        let mut deliberation = interval(millis_period(self.options.loop_interval));
        let mut status = interval(millis_period(self.options.log_interval));

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    None => {
                        info!("sensor stream closed, shutting down");
                        return Ok(());
                    }
                    Some(SensorEvent::Disconnected) => {
                        info!("disconnected, shutting down");
                        return Ok(());
                    }
                    Some(event) => self.on_event(event).await,
                },
                () = self.queue.wait_drained() => self.deliberate(),
                _ = deliberation.tick() => self.deliberate(),
                _ = hello.tick(), if self.cooperative() => self.heartbeat().await,
                _ = partition.tick(), if self.owns_partition() => {
                    refresh_partitioning(&self.plan_ctx).await;
                }
                _ = status.tick() => self.log_status(),
            }
        }
    }

    fn cooperative(&self) -> bool {
        self.plan_ctx.cooperative
    }

    fn owns_partition(&self) -> bool {
        self.cooperative() && self.plan_ctx.team.initiated_handshake()
    }

    fn now(&self) -> Millis {
        self.plan_ctx.clock.now()
    }

    // ── Sensor events ─────────────────────────────────────────────────────

    async fn on_event(&mut self, event: SensorEvent) {
        match event {
            SensorEvent::Connected => info!("connected"),
            SensorEvent::Disconnected => {} // handled by the select arm
            SensorEvent::Config(config) => {
                debug!(?config, "game config received");
                self.plan_ctx.lock_beliefs().update_config(config);
            }
            SensorEvent::You(me) => {
                self.plan_ctx.team.set_self_id(me.id.clone());
                self.plan_ctx.lock_beliefs().update_self(me);
                self.deliberate();
            }
            SensorEvent::Map { width, height, tiles } => {
                match Grid::from_specs(width, height, &tiles) {
                    Ok(grid) => {
                        info!(width, height, "map loaded");
                        self.plan_ctx.lock_beliefs().update_map(grid);
                        if self.owns_partition() {
                            refresh_partitioning(&self.plan_ctx).await;
                        }
                        self.deliberate();
                    }
                    Err(e) => warn!(error = %e, "unusable map frame"),
                }
            }
            SensorEvent::Parcels(parcels) => {
                let now = self.now();
                self.plan_ctx.lock_beliefs().update_parcels(&parcels, now);
                if self.cooperative()
                    && let Err(e) = self.plan_ctx.team.share_parcels(&parcels).await
                {
                    warn!(error = %e, "parcel relay failed");
                }
                self.deliberate();
            }
            SensorEvent::Agents(agents) => {
                let now = self.now();
                self.plan_ctx.lock_beliefs().update_agents(&agents, now);
                if self.cooperative()
                    && let Err(e) = self.plan_ctx.team.share_agents(&agents).await
                {
                    warn!(error = %e, "agent relay failed");
                }
                self.deliberate();
            }
            SensorEvent::Msg { from, envelope, reply, .. } => {
                match self.plan_ctx.team.handle(from, envelope, reply).await {
                    Ok(Some(team_event)) => self.on_team_event(team_event).await,
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "peer message failed"),
                }
            }
        }
    }

    async fn on_team_event(&mut self, event: TeamEvent) {
        match event {
            TeamEvent::HandshakeComplete { session, initiated, teammate } => {
                info!(%session, %teammate, initiated, "handshake complete");
                self.plan_ctx.lock_beliefs().set_teammate_id(teammate);
                if initiated {
                    refresh_partitioning(&self.plan_ctx).await;
                }
                self.deliberate();
            }
            TeamEvent::Parcels(parcels) => {
                let now = self.now();
                self.plan_ctx.lock_beliefs().update_parcels(&parcels, now);
                self.deliberate();
            }
            TeamEvent::Agents(agents) => {
                let now = self.now();
                self.plan_ctx.lock_beliefs().update_agents(&agents, now);
                self.deliberate();
            }
            TeamEvent::TeammateInfo(info) => {
                self.plan_ctx.lock_beliefs().update_teammate(info);
            }
            TeamEvent::Partitioning(map) => {
                debug!(assignments = map.len(), "partitioning received");
                self.plan_ctx.lock_beliefs().set_partitioning(map);
                self.deliberate();
            }
        }
    }

    // ── Deliberation ──────────────────────────────────────────────────────

    fn deliberate(&mut self) {
        let current = self.queue.current();
        let candidate = {
            let mut beliefs = self.plan_ctx.lock_beliefs();
            let ctx = OptionContext {
                cooperative: self.cooperative(),
                margin:      self.options.preemption_margin,
                current:     current.as_ref(),
                now:         self.plan_ctx.clock.now(),
            };
            next_option(&mut beliefs, &ctx, &mut self.rng)
        };
        if let Some(predicate) = candidate {
            self.queue.push(predicate);
        }
    }

    // ── Timers ────────────────────────────────────────────────────────────

    async fn heartbeat(&self) {
        let team = &self.plan_ctx.team;
        if let Err(e) = team.heartbeat(self.now().0).await {
            warn!(error = %e, "discovery shout failed");
        }
        let me = self.plan_ctx.lock_beliefs().self_agent().cloned();
        if let Some(me) = me
            && let Err(e) = team.share_info(&me).await
        {
            warn!(error = %e, "info share failed");
        }
    }

    fn log_status(&self) {
        let beliefs = self.plan_ctx.lock_beliefs();
        let position = beliefs.self_tile();
        let score = beliefs.self_agent().map(|a| a.score);
        info!(
            ?position,
            score,
            carrying = beliefs.carried_count(),
            queued = self.queue.len(),
            goal = %self.queue.current().map_or_else(|| "idle".into(), |p| p.to_string()),
            "status"
        );
    }
}

fn interval(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

fn millis_period(ms: Millis) -> Duration {
    Duration::from_millis(ms.0.max(1))
}
