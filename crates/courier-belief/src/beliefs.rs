//! The `BeliefSet` — everything the agent currently holds true about the
//! world.
//!
//! # Reconciliation model
//!
//! Sensor frames are *partial*: they only cover the observation radius.  The
//! belief set therefore distinguishes three fates for a previously known
//! parcel missing from a fresh frame:
//!
//! 1. some parcel is reported at its position → the old one is gone (picked
//!    up or expired) and is dropped;
//! 2. its position is not covered by any report → the entry is marked
//!    `outdated` and its reward decays lazily from the frozen observation;
//! 3. it is carried by this agent → left to the inventory hooks.
//!
//! Reads that can observe decay (`parcels`, `parcel_at`, …) first evict
//! every entry whose decayed reward reached zero, so no caller ever sees a
//! dead parcel.

use rustc_hash::{FxHashMap, FxHashSet};

use courier_core::{Agent, AgentId, GameConfig, Millis, Parcel, ParcelId, Point};
use courier_grid::{astar, Grid};

use crate::tracked::{TrackedAgent, TrackedParcel};

/// The agent's world model.  Created empty before the first sensor event;
/// mutated only by the driver and the plan inventory hooks.
#[derive(Default)]
pub struct BeliefSet {
    // ── Self & teammate ───────────────────────────────────────────────────
    self_state:  Option<Agent>,
    teammate_id: Option<AgentId>,
    teammate:    Option<Agent>,

    // ── Static world ──────────────────────────────────────────────────────
    config:         GameConfig,
    grid:           Option<Grid>,
    delivery_zones: Vec<Point>,
    generators:     Vec<Point>,
    longest_path:   u32,

    // ── Dynamic world ─────────────────────────────────────────────────────
    parcels:          FxHashMap<ParcelId, TrackedParcel>,
    /// Position → id of a free parcel there; answers "is there a parcel
    /// under me?" in O(1).
    active_positions: FxHashMap<Point, ParcelId>,
    other_agents:     FxHashMap<AgentId, TrackedAgent>,
    /// Tile → when it was last observed to host another agent.
    occupied:         FxHashMap<Point, Millis>,

    // ── Own state ─────────────────────────────────────────────────────────
    carried:      Vec<ParcelId>,
    partitioning: FxHashMap<Point, AgentId>,
}

impl BeliefSet {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Sensor updates ────────────────────────────────────────────────────

    pub fn update_config(&mut self, config: GameConfig) {
        self.config = config;
    }

    /// Replace the self record with a fresh sensor frame.
    pub fn update_self(&mut self, agent: Agent) {
        self.self_state = Some(agent);
    }

    /// Cheap position-only update from an actuator move confirmation; keeps
    /// beliefs exact between full sensor frames.
    pub fn update_self_position(&mut self, pos: Point) {
        if let Some(me) = &mut self.self_state {
            me.x = pos.x as f64;
            me.y = pos.y as f64;
        }
    }

    /// Cache the grid and recompute everything derived from it.  Idempotent:
    /// the same grid yields the same zones, generators, and longest path.
    pub fn update_map(&mut self, grid: Grid) {
        self.delivery_zones = grid.delivery_zones();
        self.generators = grid.generators();
        let mut strategic = self.generators.clone();
        strategic.extend_from_slice(&self.delivery_zones);
        self.longest_path = astar::longest_path(&grid, &strategic);
        self.grid = Some(grid);
    }

    /// Reconcile the parcel memory with a fresh (partial) sensor frame.
    pub fn update_parcels(&mut self, sensed: &[Parcel], now: Millis) {
        let sensed_ids: FxHashSet<&ParcelId> = sensed.iter().map(|p| &p.id).collect();
        let sensed_positions: FxHashSet<Point> = sensed.iter().map(Parcel::pos).collect();

        for parcel in sensed {
            if parcel.reward <= 0 {
                self.parcels.remove(&parcel.id);
                continue;
            }
            self.parcels
                .insert(parcel.id.clone(), TrackedParcel::fresh(parcel.clone(), now));
        }

        // Decide the fate of every known parcel the frame did not mention.
        let missing: Vec<ParcelId> = self
            .parcels
            .keys()
            .filter(|id| !sensed_ids.contains(*id))
            .cloned()
            .collect();
        for id in missing {
            if self.carried.contains(&id) {
                continue; // inventory hooks own carried parcels
            }
            let pos = self.parcels[&id].parcel.pos();
            if sensed_positions.contains(&pos) {
                self.parcels.remove(&id);
            } else if let Some(entry) = self.parcels.get_mut(&id) {
                entry.outdated = true;
            }
        }

        self.rebuild_active_positions();
    }

    /// Record agent sightings and refresh tile occupancy, forgetting entries
    /// older than the round-trip window (`longest_path × movement_duration`).
    pub fn update_agents(&mut self, sensed: &[Agent], now: Millis) {
        let self_id = self.self_state.as_ref().map(|a| a.id.clone());
        for agent in sensed {
            if Some(&agent.id) == self_id.as_ref() {
                continue;
            }
            self.occupied.insert(agent.tile(), now);
            if Some(&agent.id) == self.teammate_id.as_ref() {
                self.teammate = Some(agent.clone());
            } else {
                self.other_agents.insert(
                    agent.id.clone(),
                    TrackedAgent { agent: agent.clone(), last_seen: now },
                );
            }
        }
        if let Some(window) = self.occupancy_window_ms() {
            self.occupied.retain(|_, seen| now.since(*seen) <= window);
        }
    }

    // ── Teammate bookkeeping ──────────────────────────────────────────────

    pub fn set_teammate_id(&mut self, id: AgentId) {
        // A sighting recorded before the handshake belongs to the teammate now.
        if let Some(tracked) = self.other_agents.remove(&id) {
            self.teammate = Some(tracked.agent);
        }
        self.teammate_id = Some(id);
    }

    pub fn update_teammate(&mut self, agent: Agent) {
        self.teammate = Some(agent);
    }

    pub fn teammate(&self) -> Option<&Agent> {
        self.teammate.as_ref()
    }

    // ── Inventory hooks (called by plans) ─────────────────────────────────

    /// Record a successful pickup of `id`.
    pub fn add_carried(&mut self, id: ParcelId) {
        if let Some(me) = &self.self_state
            && let Some(entry) = self.parcels.get_mut(&id)
        {
            entry.parcel.carried_by = Some(me.id.clone());
        }
        self.active_positions.retain(|_, held| *held != id);
        if !self.carried.contains(&id) {
            self.carried.push(id);
        }
    }

    /// Record a successful drop: the carried parcels leave the world model.
    pub fn clear_carried(&mut self) {
        for id in std::mem::take(&mut self.carried) {
            self.parcels.remove(&id);
        }
        self.rebuild_active_positions();
    }

    pub fn carried(&self) -> &[ParcelId] {
        &self.carried
    }

    pub fn carried_count(&self) -> u64 {
        self.carried.len() as u64
    }

    /// Sum of the believed rewards of everything currently carried.
    pub fn carried_reward(&self, now: Millis) -> i64 {
        let interval = self.config.parcel_decay_interval;
        self.carried
            .iter()
            .filter_map(|id| self.parcels.get(id))
            .map(|entry| entry.believed_reward(now, interval))
            .sum()
    }

    // ── Parcel reads (lazy decay + eviction) ──────────────────────────────

    /// All believed parcels with decay applied.  Entries whose reward
    /// reached zero are evicted before the snapshot is taken.
    pub fn parcels(&mut self, now: Millis) -> Vec<Parcel> {
        self.evict_expired(now);
        let interval = self.config.parcel_decay_interval;
        self.parcels
            .values()
            .map(|entry| entry.snapshot(now, interval))
            .collect()
    }

    /// Believed parcels not carried by anyone.
    pub fn free_parcels(&mut self, now: Millis) -> Vec<Parcel> {
        self.parcels(now)
            .into_iter()
            .filter(Parcel::is_free)
            .collect()
    }

    /// The free parcel under `pos`, if any.
    pub fn parcel_at(&mut self, pos: Point, now: Millis) -> Option<Parcel> {
        self.evict_expired(now);
        let id = self.active_positions.get(&pos)?.clone();
        let interval = self.config.parcel_decay_interval;
        self.parcels
            .get(&id)
            .map(|entry| entry.snapshot(now, interval))
    }

    /// Look up one parcel by id with decay applied.
    pub fn parcel(&mut self, id: &ParcelId, now: Millis) -> Option<Parcel> {
        self.evict_expired(now);
        let interval = self.config.parcel_decay_interval;
        self.parcels
            .get(id)
            .map(|entry| entry.snapshot(now, interval))
    }

    fn evict_expired(&mut self, now: Millis) {
        let interval = self.config.parcel_decay_interval;
        let dead: Vec<ParcelId> = self
            .parcels
            .iter()
            .filter(|(_, entry)| entry.believed_reward(now, interval) <= 0)
            .map(|(id, _)| id.clone())
            .collect();
        if dead.is_empty() {
            return;
        }
        for id in &dead {
            self.parcels.remove(id);
            self.carried.retain(|held| held != id);
        }
        self.rebuild_active_positions();
    }

    fn rebuild_active_positions(&mut self) {
        self.active_positions.clear();
        for (id, entry) in &self.parcels {
            if entry.parcel.is_free() {
                self.active_positions.insert(entry.parcel.pos(), id.clone());
            }
        }
    }

    // ── Occupancy & agent reads ───────────────────────────────────────────

    fn occupancy_window_ms(&self) -> Option<u64> {
        if self.longest_path == 0 {
            return None;
        }
        Some(self.longest_path as u64 * self.config.movement_ms())
    }

    /// Tiles believed to host another agent at `now`.
    pub fn occupied_tiles(&self, now: Millis) -> FxHashSet<Point> {
        match self.occupancy_window_ms() {
            None => self.occupied.keys().copied().collect(),
            Some(window) => self
                .occupied
                .iter()
                .filter(|(_, seen)| now.since(**seen) <= window)
                .map(|(tile, _)| *tile)
                .collect(),
        }
    }

    /// Competitors sighted within the occupancy window (teammate excluded).
    pub fn fresh_competitors(&self, now: Millis) -> Vec<Agent> {
        let window = self.occupancy_window_ms().unwrap_or(u64::MAX);
        self.other_agents
            .values()
            .filter(|t| now.since(t.last_seen) <= window)
            .map(|t| t.agent.clone())
            .collect()
    }

    // ── Partitioning ──────────────────────────────────────────────────────

    pub fn partitioning(&self) -> &FxHashMap<Point, AgentId> {
        &self.partitioning
    }

    pub fn set_partitioning(&mut self, partitioning: FxHashMap<Point, AgentId>) {
        self.partitioning = partitioning;
    }

    /// Generators this agent is responsible for: the assigned subset in
    /// cooperative play, every generator when no partitioning is in effect.
    pub fn my_generators(&self) -> Vec<Point> {
        let Some(me) = self.self_state.as_ref() else {
            return Vec::new();
        };
        if self.partitioning.is_empty() {
            return self.generators.clone();
        }
        self.generators
            .iter()
            .filter(|g| self.partitioning.get(g) == Some(&me.id))
            .copied()
            .collect()
    }

    // ── Plain accessors ───────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn delivery_zones(&self) -> &[Point] {
        &self.delivery_zones
    }

    pub fn generators(&self) -> &[Point] {
        &self.generators
    }

    pub fn longest_path(&self) -> u32 {
        self.longest_path
    }

    pub fn self_agent(&self) -> Option<&Agent> {
        self.self_state.as_ref()
    }

    pub fn self_id(&self) -> Option<&AgentId> {
        self.self_state.as_ref().map(|a| &a.id)
    }

    pub fn self_tile(&self) -> Option<Point> {
        self.self_state.as_ref().map(Agent::tile)
    }
}
