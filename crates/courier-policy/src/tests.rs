//! Unit tests for courier-policy.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rustc_hash::FxHashSet;

use courier_belief::BeliefSet;
use courier_core::{Agent, AgentId, GameConfig, IntervalMs, Millis, Parcel, ParcelId, Point};
use courier_grid::Grid;

use crate::{
    closest_delivery, compute_partitioning, delivery_utility, next_option, parcel_threat,
    parcel_utility, OptionContext, Predicate, PredicateKind, ScoreContext,
};

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

fn fast_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.movement_duration = Millis(100);
    config.parcel_decay_interval = IntervalMs::Finite(1_000);
    config
}

fn no_obstacles() -> FxHashSet<Point> {
    FxHashSet::default()
}

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(7)
}

// ── Predicate shape ───────────────────────────────────────────────────────────

#[cfg(test)]
mod predicate_tests {
    use super::*;

    #[test]
    fn parcel_field_present_exactly_on_pickups() {
        let pickup = Predicate::pickup(Point::new(1, 0), ParcelId::from("p1"), 1.0);
        assert!(pickup.parcel.is_some());
        assert!(Predicate::deliver(Point::new(1, 0), 1.0).parcel.is_none());
        assert!(Predicate::exploration(Point::new(1, 0)).parcel.is_none());
        assert!(Predicate::go_to(Point::new(1, 0)).parcel.is_none());
    }

    #[test]
    fn same_goal_ignores_utility() {
        let a = Predicate::pickup(Point::new(1, 0), ParcelId::from("p1"), 1.0);
        let b = Predicate::pickup(Point::new(1, 0), ParcelId::from("p1"), 99.0);
        let c = Predicate::pickup(Point::new(1, 0), ParcelId::from("p2"), 1.0);
        assert!(a.same_goal(&b));
        assert!(!a.same_goal(&c));
        assert!(!a.same_goal(&Predicate::go_to(Point::new(1, 0))));
    }
}

// ── Delivery lookup & utilities ───────────────────────────────────────────────

#[cfg(test)]
mod utility_tests {
    use super::*;

    #[test]
    fn closest_delivery_takes_the_cheaper_zone() {
        let (grid, _) = Grid::from_ascii("D . S . . D").unwrap();
        let zones = [Point::new(0, 0), Point::new(5, 0)];
        let (zone, steps) =
            closest_delivery(&grid, &no_obstacles(), Point::new(2, 0), &zones).unwrap();
        assert_eq!(zone, Point::new(0, 0));
        assert_eq!(steps, 2);
    }

    #[test]
    fn closest_delivery_none_when_walled_off() {
        let (grid, _) = Grid::from_ascii("S # D").unwrap();
        assert!(closest_delivery(&grid, &no_obstacles(), Point::new(0, 0), &[Point::new(2, 0)])
            .is_none());
    }

    #[test]
    fn delivery_utility_discounts_decay() {
        let (grid, _) = Grid::from_ascii("S . . . D").unwrap();
        let blocked = no_obstacles();
        let zones = [Point::new(4, 0)];
        let ctx = ScoreContext {
            grid: &grid,
            blocked: &blocked,
            delivery_zones: &zones,
            movement_ms: 100,
            decay_ms: Some(1_000),
            carried_reward: 10,
            carried_count: 1,
        };
        // 4 steps × 100 ms = 400 ms → 1 decay tick → deliver 9 over 0.4 s.
        let utility = delivery_utility(&ctx, Point::new(0, 0));
        assert!((utility - 9.0 / 0.4).abs() < 1e-9);
    }

    #[test]
    fn delivery_utility_unreachable_is_neg_infinity() {
        let (grid, _) = Grid::from_ascii("S # D").unwrap();
        let blocked = no_obstacles();
        let zones = [Point::new(2, 0)];
        let ctx = ScoreContext {
            grid: &grid,
            blocked: &blocked,
            delivery_zones: &zones,
            movement_ms: 100,
            decay_ms: None,
            carried_reward: 10,
            carried_count: 1,
        };
        assert_eq!(delivery_utility(&ctx, Point::new(0, 0)), f64::NEG_INFINITY);
    }

    #[test]
    fn parcel_utility_balances_travel_and_decay() {
        let (grid, _) = Grid::from_ascii("S . P . D").unwrap();
        let blocked = no_obstacles();
        let zones = [Point::new(4, 0)];
        let ctx = ScoreContext {
            grid: &grid,
            blocked: &blocked,
            delivery_zones: &zones,
            movement_ms: 100,
            decay_ms: Some(1_000),
            carried_reward: 0,
            carried_count: 0,
        };
        let target = parcel("p1", 2, 0, 10);
        // t_pick = t_del = 200 ms → 1 decay tick each; n = 0 so only the
        // target loses: 10 − 1 − 1 = 8, over 0.4 s.
        let utility = parcel_utility(&ctx, Point::new(0, 0), &target, 0.0);
        assert!((utility - 8.0 / 0.4).abs() < 1e-9);
    }

    #[test]
    fn parcel_utility_unreachable_is_neg_infinity() {
        let (grid, _) = Grid::from_ascii("S # P . D").unwrap();
        let blocked = no_obstacles();
        let zones = [Point::new(4, 0)];
        let ctx = ScoreContext {
            grid: &grid,
            blocked: &blocked,
            delivery_zones: &zones,
            movement_ms: 100,
            decay_ms: None,
            carried_reward: 0,
            carried_count: 0,
        };
        let target = parcel("p1", 2, 0, 10);
        assert_eq!(
            parcel_utility(&ctx, Point::new(0, 0), &target, 0.0),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn zero_travel_time_scores_zero() {
        // Standing on a parcel that sits on a delivery tile: nothing to do,
        // the immediate-opportunity rules cover it.
        let (grid, _) = Grid::from_ascii("D . .").unwrap();
        let blocked = no_obstacles();
        let zones = [Point::new(0, 0)];
        let ctx = ScoreContext {
            grid: &grid,
            blocked: &blocked,
            delivery_zones: &zones,
            movement_ms: 100,
            decay_ms: None,
            carried_reward: 5,
            carried_count: 1,
        };
        let target = parcel("p1", 0, 0, 10);
        assert_eq!(parcel_utility(&ctx, Point::new(0, 0), &target, 0.0), 0.0);
        assert_eq!(delivery_utility(&ctx, Point::new(0, 0)), 0.0);
    }
}

// ── Threat model ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod threat_tests {
    use super::*;

    #[test]
    fn stationary_rival_contributes_proximity_share() {
        let (grid, _) = Grid::from_ascii(". . .").unwrap();
        let target = parcel("p1", 2, 0, 8);
        // Two tiles away, standing still: 8 / 4 × 0.3.
        let threat = parcel_threat(&grid, &no_obstacles(), &target, &[agent("r", 0.0, 0.0)]);
        assert!((threat - 0.6).abs() < 1e-12);
    }

    #[test]
    fn approaching_rival_adds_directed_term() {
        let (grid, _) = Grid::from_ascii(". . .").unwrap();
        let target = parcel("p1", 2, 0, 5);
        // Rival crossing into tile (1,0), heading right, one step from the
        // parcel: threat = 5×0.3 + 5×0.7×1 = 5.
        let threat = parcel_threat(&grid, &no_obstacles(), &target, &[agent("r", 0.6, 0.0)]);
        assert!((threat - 5.0).abs() < 1e-9);
    }

    #[test]
    fn receding_rival_only_contributes_proximity() {
        let (grid, _) = Grid::from_ascii(". . .").unwrap();
        let target = parcel("p1", 2, 0, 5);
        // Same tile, but heading left (fraction below one half).
        let threat = parcel_threat(&grid, &no_obstacles(), &target, &[agent("r", 1.4, 0.0)]);
        assert!((threat - 5.0 * 0.3).abs() < 1e-9);
    }

    #[test]
    fn rivals_own_tile_does_not_block_its_path() {
        let (grid, _) = Grid::from_ascii(". . .").unwrap();
        let target = parcel("p1", 2, 0, 8);
        let occupied: FxHashSet<Point> = [Point::new(0, 0)].into_iter().collect();
        let threat = parcel_threat(&grid, &occupied, &target, &[agent("r", 0.0, 0.0)]);
        assert!(threat > 0.0);
    }

    #[test]
    fn unreachable_rival_is_harmless() {
        let (grid, _) = Grid::from_ascii(". # .").unwrap();
        let target = parcel("p1", 2, 0, 8);
        let threat = parcel_threat(&grid, &no_obstacles(), &target, &[agent("r", 0.0, 0.0)]);
        assert_eq!(threat, 0.0);
    }
}

// ── Partitioning ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod partition_tests {
    use super::*;

    fn open_grid(n: u32) -> Grid {
        Grid::new(n, n, vec![courier_core::TileType::Walkable; (n * n) as usize]).unwrap()
    }

    #[test]
    fn each_agent_takes_its_nearer_generator() {
        let grid = open_grid(10);
        let generators = [Point::new(0, 0), Point::new(9, 9)];
        let agents = [
            (AgentId::from("A"), Point::new(0, 1)),
            (AgentId::from("B"), Point::new(9, 8)),
        ];
        let map = compute_partitioning(&grid, &generators, &agents);
        assert_eq!(map[&Point::new(0, 0)], AgentId::from("A"));
        assert_eq!(map[&Point::new(9, 9)], AgentId::from("B"));
    }

    #[test]
    fn colocated_agents_still_split_the_generators() {
        let grid = open_grid(10);
        let generators = [Point::new(0, 0), Point::new(9, 9)];
        let agents = [
            (AgentId::from("A"), Point::new(0, 0)),
            (AgentId::from("B"), Point::new(0, 0)),
        ];
        let map = compute_partitioning(&grid, &generators, &agents);
        let a_count = map.values().filter(|&v| *v == AgentId::from("A")).count();
        let b_count = map.values().filter(|&v| *v == AgentId::from("B")).count();
        assert_eq!((a_count, b_count), (1, 1));
    }

    #[test]
    fn partitioning_is_deterministic() {
        let grid = open_grid(8);
        let generators = [
            Point::new(0, 0),
            Point::new(7, 7),
            Point::new(0, 7),
            Point::new(7, 0),
            Point::new(3, 3),
        ];
        let agents = [
            (AgentId::from("Z"), Point::new(4, 4)),
            (AgentId::from("A"), Point::new(4, 3)),
        ];
        let first = compute_partitioning(&grid, &generators, &agents);
        // Same inputs in a different order must give the same map.
        let swapped = [agents[1].clone(), agents[0].clone()];
        let second = compute_partitioning(&grid, &generators, &swapped);
        assert_eq!(first, second);
    }

    #[test]
    fn every_generator_is_assigned_to_exactly_one_participant() {
        let grid = open_grid(6);
        let generators = [
            Point::new(0, 0),
            Point::new(5, 5),
            Point::new(0, 5),
            Point::new(5, 0),
            Point::new(2, 2),
        ];
        let agents = [
            (AgentId::from("A"), Point::new(1, 1)),
            (AgentId::from("B"), Point::new(4, 4)),
        ];
        let map = compute_partitioning(&grid, &generators, &agents);
        assert_eq!(map.len(), generators.len());
        for g in &generators {
            let owner = &map[g];
            assert!(*owner == AgentId::from("A") || *owner == AgentId::from("B"));
        }
        // 5 generators, 2 agents: 3 + 2 with the extra on the lower id.
        let a_count = map.values().filter(|&v| *v == AgentId::from("A")).count();
        assert_eq!(a_count, 3);
    }
}

// ── Option generation ─────────────────────────────────────────────────────────

#[cfg(test)]
mod option_tests {
    use super::*;

    fn beliefs_on(sketch: &str, self_tile: Point) -> BeliefSet {
        let (grid, _) = Grid::from_ascii(sketch).unwrap();
        let mut beliefs = BeliefSet::new();
        beliefs.update_config(fast_config());
        beliefs.update_map(grid);
        beliefs.update_self(agent("me", self_tile.x as f64, self_tile.y as f64));
        beliefs
    }

    fn ctx_now(current: Option<&Predicate>) -> OptionContext<'_> {
        OptionContext {
            cooperative: false,
            margin: 0.05,
            current,
            now: Millis(0),
        }
    }

    #[test]
    fn parcel_underfoot_wins_immediately() {
        let mut beliefs = beliefs_on("S . P . D", Point::new(2, 0));
        beliefs.update_parcels(&[parcel("p1", 2, 0, 10)], Millis(0));
        let option = next_option(&mut beliefs, &ctx_now(None), &mut rng()).unwrap();
        assert_eq!(option.kind, PredicateKind::Pickup);
        assert_eq!(option.parcel, Some(ParcelId::from("p1")));
        assert_eq!(option.utility, f64::INFINITY);
    }

    #[test]
    fn targeted_parcel_underfoot_is_not_repushed() {
        let mut beliefs = beliefs_on("S . P . D", Point::new(2, 0));
        beliefs.update_parcels(&[parcel("p1", 2, 0, 10)], Millis(0));
        let current = Predicate::pickup(Point::new(2, 0), ParcelId::from("p1"), 0.02);
        let option = next_option(&mut beliefs, &ctx_now(Some(&current)), &mut rng());
        assert!(option.is_none());
    }

    #[test]
    fn delivery_tile_underfoot_wins_while_loaded() {
        let mut beliefs = beliefs_on("S . P . D", Point::new(4, 0));
        beliefs.update_parcels(&[parcel("p1", 4, 0, 10)], Millis(0));
        beliefs.add_carried(ParcelId::from("p1"));
        let option = next_option(&mut beliefs, &ctx_now(None), &mut rng()).unwrap();
        assert_eq!(option.kind, PredicateKind::Deliver);
        assert_eq!(option.utility, f64::INFINITY);
    }

    #[test]
    fn best_reachable_parcel_is_chosen() {
        let mut beliefs = beliefs_on("S . P . D", Point::new(0, 0));
        beliefs.update_parcels(
            &[parcel("near", 1, 0, 8), parcel("far", 3, 0, 4)],
            Millis(0),
        );
        let option = next_option(&mut beliefs, &ctx_now(None), &mut rng()).unwrap();
        assert_eq!(option.kind, PredicateKind::Pickup);
        assert_eq!(option.parcel, Some(ParcelId::from("near")));
        assert!(option.utility > 0.0);
    }

    #[test]
    fn weak_candidate_does_not_preempt() {
        let mut beliefs = beliefs_on("S . P . D", Point::new(0, 0));
        beliefs.update_parcels(&[parcel("p1", 2, 0, 10)], Millis(0));
        // Current intention already scores far above anything here.
        let current = Predicate::deliver(Point::new(4, 0), 1_000.0);
        assert!(next_option(&mut beliefs, &ctx_now(Some(&current)), &mut rng()).is_none());
    }

    #[test]
    fn threatened_parcel_falls_back_to_exploration() {
        // Rival one step from the parcel and closing: threat 5 wipes out the
        // reward, so the only sensible option is to camp a generator.
        let mut beliefs = beliefs_on(
            ". . .\n\
             P . .\n\
             S . D",
            Point::new(0, 0),
        );
        beliefs.update_parcels(&[parcel("p1", 2, 2, 5)], Millis(0));
        beliefs.update_agents(&[agent("rival", 0.6, 2.0)], Millis(0));
        let option = next_option(&mut beliefs, &ctx_now(None), &mut rng()).unwrap();
        assert_eq!(option.kind, PredicateKind::Exploration);
        assert_eq!(option.destination, Point::new(0, 1));
    }

    #[test]
    fn cooperative_mode_skips_teammates_parcels() {
        let mut beliefs = beliefs_on("S . P . D", Point::new(0, 0));
        beliefs.update_parcels(&[parcel("p1", 2, 0, 10)], Millis(0));
        let mut partitioning = rustc_hash::FxHashMap::default();
        partitioning.insert(Point::new(2, 0), AgentId::from("buddy"));
        beliefs.set_partitioning(partitioning);

        let ctx = OptionContext {
            cooperative: true,
            margin: 0.05,
            current: None,
            now: Millis(0),
        };
        let option = next_option(&mut beliefs, &ctx, &mut rng());
        // The lone generator belongs to the teammate too: nothing to explore.
        assert!(option.is_none());
    }

    #[test]
    fn no_position_yet_means_no_option() {
        let (grid, _) = Grid::from_ascii("S . D").unwrap();
        let mut beliefs = BeliefSet::new();
        beliefs.update_config(fast_config());
        beliefs.update_map(grid);
        assert!(next_option(&mut beliefs, &ctx_now(None), &mut rng()).is_none());
    }
}
