//! The arena world, its pump task, and the per-agent endpoints.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use courier_core::{
    Agent, AgentId, GameConfig, Move, Parcel, ParcelId, Point, TileSpec, TileType,
};
use courier_grid::Grid;
use courier_net::{
    sensor_channel, Actuator, Envelope, NetError, NetResult, SensorEvent, SensorRx,
};

use crate::error::{ArenaError, ArenaResult};

/// How long an `ask` waits for the peer's reply.
const ASK_TIMEOUT: Duration = Duration::from_secs(5);

// ── Scripted spawns ───────────────────────────────────────────────────────────

/// A parcel that appears `after_ms` into the episode.
#[derive(Clone, Debug)]
pub struct ParcelSpawn {
    pub after_ms: u64,
    pub id:       ParcelId,
    pub pos:      Point,
    pub reward:   i64,
}

// ── World state ───────────────────────────────────────────────────────────────

struct Body {
    id:      AgentId,
    name:    String,
    pos:     Point,
    score:   i64,
    carried: Vec<ParcelId>,
    sensor:  courier_net::SensorTx,
}

struct WorldParcel {
    pos:             Point,
    reward_at_spawn: i64,
    spawned:         Instant,
    carried_by:      Option<AgentId>,
}

impl WorldParcel {
    /// Current reward after decay, clamped at zero.
    fn reward(&self, now: Instant, decay_ms: Option<u64>) -> i64 {
        match decay_ms {
            None | Some(0) => self.reward_at_spawn,
            Some(ms) => {
                let elapsed = now.saturating_duration_since(self.spawned).as_millis() as u64;
                (self.reward_at_spawn - (elapsed / ms) as i64).max(0)
            }
        }
    }
}

struct World {
    grid:            Grid,
    config:          GameConfig,
    epoch:           Instant,
    bodies:          FxHashMap<AgentId, Body>,
    parcels:         FxHashMap<ParcelId, WorldParcel>,
    pending:         Vec<ParcelSpawn>,
    delivered_total: i64,
    actions:         Vec<String>,
    closed:          bool,
}

impl World {
    fn decay_ms(&self) -> Option<u64> {
        self.config.decay_ms()
    }

    /// Materialize every scripted spawn whose time has come.
    fn spawn_due(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.epoch).as_millis() as u64;
        let due: Vec<ParcelSpawn> = {
            let (ready, later): (Vec<_>, Vec<_>) =
                self.pending.drain(..).partition(|s| s.after_ms <= elapsed);
            self.pending = later;
            ready
        };
        for spawn in due {
            debug!(id = %spawn.id, pos = %spawn.pos, "arena spawns parcel");
            self.parcels.insert(
                spawn.id.clone(),
                WorldParcel {
                    pos:             spawn.pos,
                    reward_at_spawn: spawn.reward,
                    spawned:         now,
                    carried_by:      None,
                },
            );
        }
    }

    /// Remove free parcels whose reward decayed to nothing.
    fn prune(&mut self, now: Instant) {
        let decay = self.decay_ms();
        self.parcels
            .retain(|_, p| p.carried_by.is_some() || p.reward(now, decay) > 0);
    }

    fn agent_record(&self, body: &Body) -> Agent {
        Agent {
            id:      body.id.clone(),
            name:    body.name.clone(),
            x:       body.pos.x as f64,
            y:       body.pos.y as f64,
            score:   body.score,
            penalty: None,
        }
    }

    /// The tile a parcel is sensed at: its carrier's tile while carried.
    fn parcel_tile(&self, parcel: &WorldParcel) -> Point {
        parcel
            .carried_by
            .as_ref()
            .and_then(|carrier| self.bodies.get(carrier))
            .map_or(parcel.pos, |b| b.pos)
    }

    fn tile_occupied_by_other(&self, who: &AgentId, tile: Point) -> bool {
        self.bodies
            .values()
            .any(|b| b.id != *who && b.pos == tile)
    }
}

// ── Arena ─────────────────────────────────────────────────────────────────────

/// Shared handle on the world.  Clone freely; [`Arena::join`] hands out the
/// per-agent sensor stream and actuator.
#[derive(Clone)]
pub struct Arena {
    world: Arc<Mutex<World>>,
}

impl Arena {
    /// Build an arena from an ASCII sketch (see [`Grid::from_ascii`]).
    /// Returns the arena plus the `S` start tiles in reading order.
    pub fn from_sketch(sketch: &str, config: GameConfig) -> ArenaResult<(Self, Vec<Point>)> {
        let (grid, starts) = Grid::from_ascii(sketch)?;
        let world = World {
            grid,
            config,
            epoch: Instant::now(),
            bodies: FxHashMap::default(),
            parcels: FxHashMap::default(),
            pending: Vec::new(),
            delivered_total: 0,
            actions: Vec::new(),
            closed: false,
        };
        Ok((Self { world: Arc::new(Mutex::new(world)) }, starts))
    }

    /// Script a parcel appearance.
    pub fn schedule_parcel(&self, spawn: ParcelSpawn) {
        self.lock().pending.push(spawn);
    }

    /// Seed `count` parcels across the generator tiles, one per
    /// `PARCELS_GENERATION_INTERVAL`, round-robin in row-major order.  Used
    /// by the demo and the `start-agent` arena transport.
    pub fn scatter_parcels(&self, count: u32, reward: i64) {
        let mut world = self.lock();
        let generators = world.grid.generators();
        if generators.is_empty() {
            return;
        }
        let interval = world
            .config
            .parcels_generation_interval
            .as_millis()
            .unwrap_or(2_000);
        for i in 0..count {
            let pos = generators[i as usize % generators.len()];
            world.pending.push(ParcelSpawn {
                after_ms: u64::from(i) * interval,
                id:       ParcelId(format!("p{}", i + 1)),
                pos,
                reward,
            });
        }
    }

    /// Register an agent and hand back its I/O pair.  The sensor stream
    /// immediately carries `Connected`, `Config`, `Map`, and an initial
    /// `You` frame.
    pub fn join(
        &self,
        id:    &str,
        name:  &str,
        start: Point,
    ) -> ArenaResult<(SensorRx, Arc<dyn Actuator>)> {
        let agent_id = AgentId::from(id);
        let (tx, rx) = sensor_channel();
        {
            let mut world = self.lock();
            if !world.grid.is_walkable(start) {
                return Err(ArenaError::BadStart(start));
            }
            if world.bodies.contains_key(&agent_id) {
                return Err(ArenaError::DuplicateAgent(id.to_owned()));
            }

            let body = Body {
                id:      agent_id.clone(),
                name:    name.to_owned(),
                pos:     start,
                score:   0,
                carried: Vec::new(),
                sensor:  tx,
            };

            let _ = body.sensor.send(SensorEvent::Connected);
            let _ = body.sensor.send(SensorEvent::Config(world.config.clone()));
            let _ = body.sensor.send(SensorEvent::Map {
                width:  world.grid.width(),
                height: world.grid.height(),
                tiles:  map_tiles(&world.grid),
            });
            let _ = body.sensor.send(SensorEvent::You(world.agent_record(&body)));

            world.bodies.insert(agent_id.clone(), body);
        }
        let endpoint = Endpoint { world: Arc::clone(&self.world), id: agent_id };
        Ok((rx, Arc::new(endpoint)))
    }

    /// Start the sensing pump: one frame per `CLOCK` interval to every
    /// joined agent.  Runs until [`close`][Self::close].
    pub fn start(&self) {
        let world = Arc::clone(&self.world);
        let period = {
            let w = lock_world(&world);
            w.config.clock.as_millis().unwrap_or(50).max(1)
        };
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(period));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !pump(&world) {
                    break;
                }
            }
        });
    }

    /// Disconnect everyone and stop the pump.
    pub fn close(&self) {
        let mut world = self.lock();
        world.closed = true;
        for body in world.bodies.values() {
            let _ = body.sensor.send(SensorEvent::Disconnected);
        }
        world.bodies.clear();
    }

    pub fn score_of(&self, id: &str) -> i64 {
        self.lock()
            .bodies
            .get(&AgentId::from(id))
            .map_or(0, |b| b.score)
    }

    /// Total reward delivered by everyone so far.
    pub fn delivered_total(&self) -> i64 {
        self.lock().delivered_total
    }

    /// The chronological action log (`"agent:action"` entries).
    pub fn actions(&self) -> Vec<String> {
        self.lock().actions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, World> {
        lock_world(&self.world)
    }
}

fn lock_world(world: &Arc<Mutex<World>>) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Announce every non-hole tile, the way the real map event does.
fn map_tiles(grid: &Grid) -> Vec<TileSpec> {
    let mut tiles = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let p = Point::new(x as i32, y as i32);
            if let Some(kind) = grid.get(p)
                && kind != TileType::NonWalkable
            {
                tiles.push(TileSpec { x: p.x, y: p.y, kind: kind.wire_value() });
            }
        }
    }
    tiles
}

/// One sensing frame.  Returns `false` once the arena closed.
fn pump(world: &Arc<Mutex<World>>) -> bool {
    let mut guard = lock_world(world);
    let w = &mut *guard;
    if w.closed {
        return false;
    }
    let now = Instant::now();
    w.spawn_due(now);
    w.prune(now);

    let decay = w.decay_ms();
    let parcel_radius = w.config.parcels_observation_distance;
    let agent_radius = w.config.agents_observation_distance;

    for body in w.bodies.values() {
        let you = w.agent_record(body);

        let parcels: Vec<Parcel> = w
            .parcels
            .iter()
            .filter(|(_, p)| w.parcel_tile(p).manhattan(body.pos) <= parcel_radius)
            .map(|(id, p)| {
                let tile = w.parcel_tile(p);
                Parcel {
                    id:         id.clone(),
                    x:          tile.x,
                    y:          tile.y,
                    reward:     p.reward(now, decay),
                    carried_by: p.carried_by.clone(),
                }
            })
            .collect();

        let agents: Vec<Agent> = w
            .bodies
            .values()
            .filter(|other| other.id != body.id && other.pos.manhattan(body.pos) <= agent_radius)
            .map(|other| w.agent_record(other))
            .collect();

        let _ = body.sensor.send(SensorEvent::You(you));
        let _ = body.sensor.send(SensorEvent::Parcels(parcels));
        let _ = body.sensor.send(SensorEvent::Agents(agents));
    }
    true
}

// ── Endpoint (per-agent actuator) ─────────────────────────────────────────────

struct Endpoint {
    world: Arc<Mutex<World>>,
    id:    AgentId,
}

impl Endpoint {
    fn lock(&self) -> MutexGuard<'_, World> {
        lock_world(&self.world)
    }
}

#[async_trait]
impl Actuator for Endpoint {
    async fn step(&self, direction: Move) -> NetResult<Option<Point>> {
        let wait = { self.lock().config.movement_ms() };
        tokio::time::sleep(Duration::from_millis(wait)).await;

        let mut guard = self.lock();
        let w = &mut *guard;
        if w.closed {
            return Err(NetError::Transport("arena closed".into()));
        }
        let Some(body) = w.bodies.get(&self.id) else {
            return Err(NetError::Transport("agent left the arena".into()));
        };
        let target = body.pos.step(direction);
        if !w.grid.is_walkable(target) || w.tile_occupied_by_other(&self.id, target) {
            w.actions.push(format!("{}:refused-{direction}", self.id));
            return Ok(None);
        }
        if let Some(body) = w.bodies.get_mut(&self.id) {
            body.pos = target;
        }
        w.actions.push(format!("{}:{direction}", self.id));
        Ok(Some(target))
    }

    async fn pick_up(&self) -> NetResult<Vec<ParcelId>> {
        let mut guard = self.lock();
        let w = &mut *guard;
        if w.closed {
            return Err(NetError::Transport("arena closed".into()));
        }
        let Some(pos) = w.bodies.get(&self.id).map(|b| b.pos) else {
            return Err(NetError::Transport("agent left the arena".into()));
        };

        let mut taken = Vec::new();
        for (id, parcel) in w.parcels.iter_mut() {
            if parcel.carried_by.is_none() && parcel.pos == pos {
                parcel.carried_by = Some(self.id.clone());
                taken.push(id.clone());
            }
        }
        if let Some(body) = w.bodies.get_mut(&self.id) {
            body.carried.extend(taken.iter().cloned());
        }
        w.actions.push(format!("{}:pickup", self.id));
        Ok(taken)
    }

    async fn put_down(&self) -> NetResult<Vec<ParcelId>> {
        let mut guard = self.lock();
        let w = &mut *guard;
        if w.closed {
            return Err(NetError::Transport("arena closed".into()));
        }
        let Some((pos, carried)) = w
            .bodies
            .get_mut(&self.id)
            .map(|b| (b.pos, std::mem::take(&mut b.carried)))
        else {
            return Err(NetError::Transport("agent left the arena".into()));
        };

        let now = Instant::now();
        let decay = w.decay_ms();
        let delivering = w.grid.get(pos) == Some(TileType::Delivery);
        let mut earned = 0;
        for id in &carried {
            if delivering {
                if let Some(parcel) = w.parcels.remove(id) {
                    earned += parcel.reward(now, decay);
                }
            } else if let Some(parcel) = w.parcels.get_mut(id) {
                parcel.carried_by = None;
                parcel.pos = pos;
            }
        }
        if delivering {
            w.delivered_total += earned;
            if let Some(body) = w.bodies.get_mut(&self.id) {
                body.score += earned;
            }
        }
        w.actions.push(format!("{}:drop", self.id));
        Ok(carried)
    }

    async fn say(&self, to: &AgentId, envelope: &Envelope) -> NetResult<()> {
        let w = self.lock();
        if let Some(target) = w.bodies.get(to) {
            let _ = target.sensor.send(SensorEvent::Msg {
                from:     self.id.clone(),
                name:     self.id.to_string(),
                envelope: envelope.clone(),
                reply:    None,
            });
        }
        Ok(())
    }

    async fn shout(&self, envelope: &Envelope) -> NetResult<()> {
        let w = self.lock();
        for target in w.bodies.values().filter(|b| b.id != self.id) {
            let _ = target.sensor.send(SensorEvent::Msg {
                from:     self.id.clone(),
                name:     self.id.to_string(),
                envelope: envelope.clone(),
                reply:    None,
            });
        }
        Ok(())
    }

    async fn ask(&self, to: &AgentId, envelope: &Envelope) -> NetResult<Envelope> {
        let (tx, rx) = oneshot::channel();
        {
            let w = self.lock();
            let Some(target) = w.bodies.get(to) else {
                return Err(NetError::Transport(format!("no agent {to} to ask")));
            };
            target
                .sensor
                .send(SensorEvent::Msg {
                    from:     self.id.clone(),
                    name:     self.id.to_string(),
                    envelope: envelope.clone(),
                    reply:    Some(tx),
                })
                .map_err(|_| NetError::Transport("peer sensor closed".into()))?;
        }
        match tokio::time::timeout(ASK_TIMEOUT, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(NetError::Transport("peer dropped the reply".into())),
            Err(_) => Err(NetError::Transport("ask timed out".into())),
        }
    }
}
