//! Unit tests for courier-arena.

use std::time::Duration;

use courier_core::{GameConfig, IntervalMs, Millis, Move, ParcelId, Point};
use courier_net::{Envelope, SensorEvent};

use crate::{Arena, ParcelSpawn};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn fast_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.movement_duration = Millis(100);
    config.parcel_decay_interval = IntervalMs::Finite(1_000);
    config.clock = IntervalMs::Finite(50);
    config
}

fn spawn(id: &str, pos: Point, reward: i64, after_ms: u64) -> ParcelSpawn {
    ParcelSpawn { after_ms, id: ParcelId::from(id), pos, reward }
}

// ── Movement, pickup, delivery ────────────────────────────────────────────────

#[cfg(test)]
mod flow_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn carry_a_parcel_to_delivery() {
        let (arena, starts) = Arena::from_sketch("S . P . D", fast_config()).unwrap();
        arena.schedule_parcel(spawn("p1", Point::new(2, 0), 10, 0));
        let (_rx, actuator) = arena.join("a1", "runner", starts[0]).unwrap();
        arena.start();
        tokio::time::sleep(Duration::from_millis(60)).await; // one pump tick

        assert_eq!(actuator.step(Move::Right).await.unwrap(), Some(Point::new(1, 0)));
        assert_eq!(actuator.step(Move::Right).await.unwrap(), Some(Point::new(2, 0)));
        assert_eq!(actuator.pick_up().await.unwrap(), vec![ParcelId::from("p1")]);
        actuator.step(Move::Right).await.unwrap();
        actuator.step(Move::Right).await.unwrap();
        let dropped = actuator.put_down().await.unwrap();

        assert_eq!(dropped, vec![ParcelId::from("p1")]);
        // 400 ms of carrying at 1 s decay: full reward lands.
        assert_eq!(arena.score_of("a1"), 10);
        assert_eq!(arena.delivered_total(), 10);
        assert!(arena.actions().contains(&"a1:pickup".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_outside_delivery_leaves_parcel_on_tile() {
        let (arena, starts) = Arena::from_sketch("S . P . D", fast_config()).unwrap();
        arena.schedule_parcel(spawn("p1", Point::new(0, 0), 10, 0));
        let (_rx, actuator) = arena.join("a1", "runner", starts[0]).unwrap();
        arena.start();
        tokio::time::sleep(Duration::from_millis(60)).await;

        actuator.pick_up().await.unwrap();
        actuator.step(Move::Right).await.unwrap();
        actuator.put_down().await.unwrap();

        assert_eq!(arena.score_of("a1"), 0);
        // Parcel is free again on (1,0): walking back and picking works.
        actuator.pick_up().await.unwrap();
        assert_eq!(arena.score_of("a1"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn occupied_tile_refuses_the_step() {
        let (arena, _) = Arena::from_sketch("S S .", fast_config()).unwrap();
        let (_rx_a, actuator_a) = arena.join("a1", "left", Point::new(0, 0)).unwrap();
        let (_rx_b, _actuator_b) = arena.join("a2", "right", Point::new(1, 0)).unwrap();

        assert_eq!(actuator_a.step(Move::Right).await.unwrap(), None);
        assert_eq!(actuator_a.step(Move::Up).await.unwrap(), None); // off-grid
    }

    #[tokio::test(start_paused = true)]
    async fn decayed_parcels_disappear() {
        let (arena, starts) = Arena::from_sketch("S . .", fast_config()).unwrap();
        arena.schedule_parcel(spawn("p1", Point::new(0, 0), 2, 0));
        let (_rx, actuator) = arena.join("a1", "runner", starts[0]).unwrap();
        arena.start();

        // After 2.2 s the reward hit zero and the pump pruned the parcel.
        tokio::time::sleep(Duration::from_millis(2_200)).await;
        assert!(actuator.pick_up().await.unwrap().is_empty());
    }
}

// ── Sensing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sensing_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn join_delivers_bootstrap_frames() {
        let (arena, starts) = Arena::from_sketch("S . D", fast_config()).unwrap();
        let (mut rx, _actuator) = arena.join("a1", "runner", starts[0]).unwrap();

        assert!(matches!(rx.recv().await, Some(SensorEvent::Connected)));
        assert!(matches!(rx.recv().await, Some(SensorEvent::Config(_))));
        match rx.recv().await {
            Some(SensorEvent::Map { width, height, tiles }) => {
                assert_eq!((width, height), (3, 1));
                assert_eq!(tiles.len(), 3); // no holes on this map
            }
            other => panic!("expected map frame, got {other:?}"),
        }
        match rx.recv().await {
            Some(SensorEvent::You(me)) => assert_eq!(me.tile(), Point::new(0, 0)),
            other => panic!("expected self frame, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_radius_parcels_are_not_sensed() {
        let mut config = fast_config();
        config.parcels_observation_distance = 2;
        let (arena, starts) = Arena::from_sketch("S . . . .", config).unwrap();
        arena.schedule_parcel(spawn("near", Point::new(1, 0), 5, 0));
        arena.schedule_parcel(spawn("far", Point::new(4, 0), 5, 0));
        let (mut rx, _actuator) = arena.join("a1", "runner", starts[0]).unwrap();
        arena.start();
        tokio::time::sleep(Duration::from_millis(60)).await;

        // Skim events until the first parcel frame.
        let mut seen = None;
        while let Ok(event) = rx.try_recv() {
            if let SensorEvent::Parcels(parcels) = event {
                seen = Some(parcels);
            }
        }
        let parcels = seen.expect("a parcel frame should have arrived");
        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels[0].id, ParcelId::from("near"));
    }
}

// ── Message bus ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod bus_tests {
    use super::*;
    use courier_core::AgentId;

    #[tokio::test(start_paused = true)]
    async fn say_reaches_the_target_only() {
        let (arena, _) = Arena::from_sketch("S S S", fast_config()).unwrap();
        let (mut rx_b, _act_b) = arena.join("b", "bee", Point::new(1, 0)).unwrap();
        let (mut rx_c, _act_c) = arena.join("c", "sea", Point::new(2, 0)).unwrap();
        let (_rx_a, act_a) = arena.join("a", "aye", Point::new(0, 0)).unwrap();

        let hello = Envelope::Hello { team: "k".into(), agent: AgentId::from("a"), stamp: 1 };
        act_a.say(&AgentId::from("b"), &hello).await.unwrap();

        // Drain b's bootstrap frames until the message shows up.
        let mut got = false;
        while let Ok(event) = rx_b.try_recv() {
            if let SensorEvent::Msg { from, envelope, .. } = event {
                assert_eq!(from, AgentId::from("a"));
                assert_eq!(envelope, hello);
                got = true;
            }
        }
        assert!(got, "b should have received the say");
        while let Ok(event) = rx_c.try_recv() {
            assert!(!matches!(event, SensorEvent::Msg { .. }), "c must not see it");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ask_round_trips_through_the_reply_channel() {
        let (arena, _) = Arena::from_sketch("S S", fast_config()).unwrap();
        let (mut rx_b, _act_b) = arena.join("b", "bee", Point::new(1, 0)).unwrap();
        let (_rx_a, act_a) = arena.join("a", "aye", Point::new(0, 0)).unwrap();

        // Responder: answer the first ask with a confirm.
        tokio::spawn(async move {
            while let Some(event) = rx_b.recv().await {
                if let SensorEvent::Msg { reply: Some(reply), .. } = event {
                    let _ = reply.send(Envelope::HandshakeConfirm {
                        session: "s1".into(),
                        from:    AgentId::from("b"),
                    });
                    break;
                }
            }
        });

        let question = Envelope::HandshakeInit {
            team_key: "k".into(),
            nonce:    9,
            from:     AgentId::from("a"),
        };
        let answer = act_a.ask(&AgentId::from("b"), &question).await.unwrap();
        assert!(matches!(answer, Envelope::HandshakeConfirm { .. }));
    }
}
