//! Unit tests for courier-belief.

use courier_core::{Agent, AgentId, GameConfig, IntervalMs, Millis, Parcel, ParcelId, Point};
use courier_grid::Grid;

use crate::BeliefSet;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn agent(id: &str, x: f64, y: f64) -> Agent {
    Agent {
        id: AgentId::from(id),
        name: id.to_owned(),
        x,
        y,
        score: 0,
        penalty: None,
    }
}

fn parcel(id: &str, x: i32, y: i32, reward: i64) -> Parcel {
    Parcel {
        id: ParcelId::from(id),
        x,
        y,
        reward,
        carried_by: None,
    }
}

fn beliefs_with_self() -> BeliefSet {
    let mut beliefs = BeliefSet::new();
    beliefs.update_config(GameConfig::default());
    beliefs.update_self(agent("me", 0.0, 0.0));
    beliefs
}

// ── Parcel reconciliation ─────────────────────────────────────────────────────

#[cfg(test)]
mod reconciliation_tests {
    use super::*;

    #[test]
    fn fresh_parcels_are_stored_and_indexed() {
        let mut beliefs = beliefs_with_self();
        beliefs.update_parcels(&[parcel("p1", 2, 0, 10)], Millis(0));
        assert_eq!(beliefs.parcels(Millis(0)).len(), 1);
        assert!(beliefs.parcel_at(Point::new(2, 0), Millis(0)).is_some());
    }

    #[test]
    fn missing_parcel_at_reported_position_is_dropped() {
        let mut beliefs = beliefs_with_self();
        beliefs.update_parcels(&[parcel("p1", 2, 0, 10)], Millis(0));
        // A different parcel is now reported on the same tile: p1 is gone.
        beliefs.update_parcels(&[parcel("p2", 2, 0, 4)], Millis(100));
        let ids: Vec<_> = beliefs
            .parcels(Millis(100))
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![ParcelId::from("p2")]);
    }

    #[test]
    fn missing_parcel_at_unseen_position_goes_outdated() {
        let mut beliefs = beliefs_with_self();
        beliefs.update_parcels(&[parcel("p1", 2, 0, 10)], Millis(0));
        // Next frame covers a different area entirely: p1 is remembered.
        beliefs.update_parcels(&[parcel("p2", 9, 9, 5)], Millis(100));
        let p1 = beliefs.parcel(&ParcelId::from("p1"), Millis(100)).unwrap();
        assert_eq!(p1.reward, 10); // frozen, not yet decayed
        assert!(beliefs.parcel_at(Point::new(2, 0), Millis(100)).is_some());
    }

    #[test]
    fn same_frame_twice_is_a_no_op() {
        let frame = [parcel("p1", 2, 0, 10), parcel("p2", 3, 1, 5)];
        let mut beliefs = beliefs_with_self();
        beliefs.update_parcels(&frame, Millis(50));
        let mut first = beliefs.parcels(Millis(50));
        beliefs.update_parcels(&frame, Millis(50));
        let mut second = beliefs.parcels(Millis(50));
        first.sort_by(|a, b| a.id.cmp(&b.id));
        second.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(first, second);
        assert!(beliefs.parcel_at(Point::new(2, 0), Millis(50)).is_some());
        assert!(beliefs.parcel_at(Point::new(3, 1), Millis(50)).is_some());
    }

    #[test]
    fn carried_parcels_survive_reconciliation() {
        let mut beliefs = beliefs_with_self();
        beliefs.update_parcels(&[parcel("p1", 0, 0, 10)], Millis(0));
        beliefs.add_carried(ParcelId::from("p1"));
        // Frames no longer mention p1 (some simulators omit held parcels).
        beliefs.update_parcels(&[], Millis(100));
        assert_eq!(beliefs.carried_count(), 1);
        assert_eq!(beliefs.carried_reward(Millis(100)), 10);
    }

    #[test]
    fn zero_reward_parcels_never_enter_the_set() {
        let mut beliefs = beliefs_with_self();
        beliefs.update_parcels(&[parcel("p1", 2, 0, 0)], Millis(0));
        assert!(beliefs.parcels(Millis(0)).is_empty());
    }
}

// ── Decay & eviction ──────────────────────────────────────────────────────────

#[cfg(test)]
mod decay_tests {
    use super::*;

    /// Parcel last seen at t0 with reward 3, decay interval 1 s: at
    /// t0 + 3.5 s the belief set must report no such parcel.
    #[test]
    fn outdated_parcel_decays_to_eviction() {
        let mut beliefs = beliefs_with_self();
        beliefs.update_parcels(&[parcel("p1", 2, 0, 3)], Millis(0));
        beliefs.update_parcels(&[], Millis(10)); // now outdated

        // 2 intervals gone: reward 1.
        let p1 = beliefs.parcel(&ParcelId::from("p1"), Millis(2_010)).unwrap();
        assert_eq!(p1.reward, 1);

        // 3.5 s after last sighting: evicted, index cleaned.
        assert!(beliefs.parcel(&ParcelId::from("p1"), Millis(3_510)).is_none());
        assert!(beliefs.parcel_at(Point::new(2, 0), Millis(3_510)).is_none());
        assert!(beliefs.parcels(Millis(3_510)).is_empty());
    }

    #[test]
    fn fresh_parcels_do_not_decay_between_frames() {
        let mut beliefs = beliefs_with_self();
        beliefs.update_parcels(&[parcel("p1", 2, 0, 3)], Millis(0));
        // Still fresh (never went outdated): reward reported verbatim.
        let p1 = beliefs.parcel(&ParcelId::from("p1"), Millis(60_000)).unwrap();
        assert_eq!(p1.reward, 3);
    }

    #[test]
    fn infinite_interval_disables_decay() {
        let mut config = GameConfig::default();
        config.parcel_decay_interval = IntervalMs::Infinite;
        let mut beliefs = BeliefSet::new();
        beliefs.update_config(config);
        beliefs.update_self(agent("me", 0.0, 0.0));
        beliefs.update_parcels(&[parcel("p1", 2, 0, 3)], Millis(0));
        beliefs.update_parcels(&[], Millis(10));
        let p1 = beliefs
            .parcel(&ParcelId::from("p1"), Millis(600_000))
            .unwrap();
        assert_eq!(p1.reward, 3);
    }
}

// ── Map caching ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod map_tests {
    use super::*;

    #[test]
    fn update_map_is_idempotent() {
        let (grid, _) = Grid::from_ascii("P . . . D").unwrap();
        let mut beliefs = beliefs_with_self();

        beliefs.update_map(grid.clone());
        let zones = beliefs.delivery_zones().to_vec();
        let generators = beliefs.generators().to_vec();
        let longest = beliefs.longest_path();

        beliefs.update_map(grid);
        assert_eq!(beliefs.delivery_zones(), zones.as_slice());
        assert_eq!(beliefs.generators(), generators.as_slice());
        assert_eq!(beliefs.longest_path(), longest);
        assert_eq!(longest, 4);
    }
}

// ── Occupancy & sightings ─────────────────────────────────────────────────────

#[cfg(test)]
mod occupancy_tests {
    use super::*;

    fn beliefs_with_map() -> BeliefSet {
        let (grid, _) = Grid::from_ascii("P . . . D").unwrap();
        let mut beliefs = beliefs_with_self();
        beliefs.update_map(grid); // longest_path = 4 → window = 4 × 500 ms
        beliefs
    }

    #[test]
    fn sighted_agents_occupy_their_tile() {
        let mut beliefs = beliefs_with_map();
        beliefs.update_agents(&[agent("rival", 2.0, 0.0)], Millis(0));
        assert!(beliefs.occupied_tiles(Millis(0)).contains(&Point::new(2, 0)));
        assert_eq!(beliefs.fresh_competitors(Millis(0)).len(), 1);
    }

    #[test]
    fn stale_occupancy_is_forgotten() {
        let mut beliefs = beliefs_with_map();
        beliefs.update_agents(&[agent("rival", 2.0, 0.0)], Millis(0));
        // Window is 2 000 ms; at 2 001 the entry is gone.
        assert!(beliefs.occupied_tiles(Millis(2_001)).is_empty());
        // The next sighting update also physically drops it.
        beliefs.update_agents(&[], Millis(2_001));
        assert!(beliefs.occupied_tiles(Millis(0)).is_empty());
    }

    #[test]
    fn self_is_never_an_obstacle() {
        let mut beliefs = beliefs_with_map();
        beliefs.update_agents(&[agent("me", 1.0, 0.0)], Millis(0));
        assert!(beliefs.occupied_tiles(Millis(0)).is_empty());
        assert!(beliefs.fresh_competitors(Millis(0)).is_empty());
    }

    #[test]
    fn teammate_blocks_tiles_but_is_not_a_competitor() {
        let mut beliefs = beliefs_with_map();
        beliefs.set_teammate_id(AgentId::from("buddy"));
        beliefs.update_agents(&[agent("buddy", 3.0, 0.0)], Millis(0));
        assert!(beliefs.occupied_tiles(Millis(0)).contains(&Point::new(3, 0)));
        assert!(beliefs.fresh_competitors(Millis(0)).is_empty());
        assert_eq!(beliefs.teammate().unwrap().id, AgentId::from("buddy"));
    }

}

// ── Inventory ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod inventory_tests {
    use super::*;

    #[test]
    fn pickup_marks_parcel_carried() {
        let mut beliefs = beliefs_with_self();
        beliefs.update_parcels(&[parcel("p1", 0, 0, 10)], Millis(0));
        beliefs.add_carried(ParcelId::from("p1"));

        assert_eq!(beliefs.carried(), &[ParcelId::from("p1")]);
        assert_eq!(beliefs.carried_reward(Millis(0)), 10);
        // No longer a free parcel under us.
        assert!(beliefs.parcel_at(Point::new(0, 0), Millis(0)).is_none());
        let p1 = beliefs.parcel(&ParcelId::from("p1"), Millis(0)).unwrap();
        assert_eq!(p1.carried_by, Some(AgentId::from("me")));
    }

    #[test]
    fn drop_clears_inventory_and_world() {
        let mut beliefs = beliefs_with_self();
        beliefs.update_parcels(&[parcel("p1", 0, 0, 10), parcel("p2", 0, 0, 4)], Millis(0));
        beliefs.add_carried(ParcelId::from("p1"));
        beliefs.add_carried(ParcelId::from("p2"));
        beliefs.clear_carried();

        assert_eq!(beliefs.carried_count(), 0);
        assert_eq!(beliefs.carried_reward(Millis(0)), 0);
        assert!(beliefs.parcels(Millis(0)).is_empty());
    }

    #[test]
    fn duplicate_pickup_recorded_once() {
        let mut beliefs = beliefs_with_self();
        beliefs.update_parcels(&[parcel("p1", 0, 0, 10)], Millis(0));
        beliefs.add_carried(ParcelId::from("p1"));
        beliefs.add_carried(ParcelId::from("p1"));
        assert_eq!(beliefs.carried_count(), 1);
    }
}

// ── Partitioning cache ────────────────────────────────────────────────────────

#[cfg(test)]
mod partition_tests {
    use rustc_hash::FxHashMap;

    use super::*;

    #[test]
    fn empty_partitioning_means_every_generator_is_mine() {
        let (grid, _) = Grid::from_ascii("P . P . D").unwrap();
        let mut beliefs = beliefs_with_self();
        beliefs.update_map(grid);
        assert_eq!(
            beliefs.my_generators(),
            vec![Point::new(0, 0), Point::new(2, 0)]
        );
    }

    #[test]
    fn partitioning_filters_generators() {
        let (grid, _) = Grid::from_ascii("P . P . D").unwrap();
        let mut beliefs = beliefs_with_self();
        beliefs.update_map(grid);

        let mut partitioning = FxHashMap::default();
        partitioning.insert(Point::new(0, 0), AgentId::from("me"));
        partitioning.insert(Point::new(2, 0), AgentId::from("buddy"));
        beliefs.set_partitioning(partitioning);

        assert_eq!(beliefs.my_generators(), vec![Point::new(0, 0)]);
    }
}
