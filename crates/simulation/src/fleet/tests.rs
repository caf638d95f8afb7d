//! Unit tests for the vehicle state machine and fleet run state.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::dispatch::DispatchEntry;
    use crate::fleet::state::FleetState;
    use crate::fleet::types::{RoutingFault, Vehicle, VehicleEvent, VehicleState};
    use crate::network::{EdgeDef, Network, RouteDefinition, Stop, StopKind};

    /// Straight three-stop line: 1 -> 2 -> 3, one route over all of it.
    fn line_network() -> Network {
        let stop = |id, x| Stop {
            id,
            code: format!("S{id}"),
            name: format!("Stop {id}"),
            x,
            y: 0.0,
            kind: if id == 2 {
                StopKind::Stop
            } else {
                StopKind::Terminal
            },
        };
        let edge = |from, to| EdgeDef {
            from,
            to,
            curve_x: 0.0,
            curve_y: 0.0,
        };
        Network::from_parts(
            vec![stop(1, 0.0), stop(2, 100.0), stop(3, 200.0)],
            vec![edge(1, 2), edge(2, 3)],
            vec![RouteDefinition {
                id: 1,
                name: "Line".into(),
                stop_ids: vec![1, 2, 3],
                color: [200, 40, 40],
            }],
        )
    }

    fn spawn_on_line(network: &Network, now_ms: f64) -> Vehicle {
        Vehicle::spawn(0, 1, [200, 40, 40], vec![1, 2, 3], network, now_ms)
    }

    #[test]
    fn three_stop_trip_timeline() {
        // segment_travel=2000ms, stop_dwell=1000ms, final_dwell=2000ms:
        // MOVING 0-2000, WAITING 2000-3000, MOVING 3000-5000,
        // WAITING_FINAL 5000-7000, FINISHED at 7000.
        let network = line_network();
        let mut vehicle = spawn_on_line(&network, 0.0);
        assert_eq!(vehicle.state, VehicleState::Moving);

        assert_eq!(vehicle.advance(1000.0, &network), None);
        assert_eq!(vehicle.state, VehicleState::Moving);

        let arrival = vehicle.advance(2000.0, &network);
        assert_eq!(arrival, Some(VehicleEvent::Arrived(2)));
        assert_eq!(vehicle.state, VehicleState::Waiting);

        assert_eq!(vehicle.advance(2999.0, &network), None);
        assert_eq!(vehicle.state, VehicleState::Waiting);

        // Dwell over: back on the road for the second segment.
        assert_eq!(vehicle.advance(3000.5, &network), None);
        assert_eq!(vehicle.state, VehicleState::Moving);
        assert_eq!(vehicle.leg, 1);

        let final_arrival = vehicle.advance(5000.5, &network);
        assert_eq!(final_arrival, Some(VehicleEvent::Arrived(3)));
        assert_eq!(vehicle.state, VehicleState::WaitingFinal);

        assert_eq!(vehicle.advance(7000.0, &network), None);
        assert_eq!(vehicle.state, VehicleState::WaitingFinal);

        let completion = vehicle.advance(7000.6, &network);
        assert_eq!(
            completion,
            Some(VehicleEvent::Completed {
                route_id: 1,
                fault: None
            })
        );
        assert!(vehicle.is_finished());

        // Absorbing: no further events.
        assert_eq!(vehicle.advance(9000.0, &network), None);
        assert!(vehicle.is_finished());
    }

    #[test]
    fn moving_interpolates_along_the_segment() {
        let network = line_network();
        let mut vehicle = spawn_on_line(&network, 0.0);
        vehicle.advance(1000.0, &network);
        // Halfway through a straight 0->100 segment.
        assert!((vehicle.position.x - 50.0).abs() < 1e-3);
        assert!(vehicle.position.y.abs() < 1e-3);
        assert!(vehicle.heading_degrees.abs() < 1e-3);
    }

    #[test]
    fn waiting_position_is_frozen_at_arrival_point() {
        let network = line_network();
        let mut vehicle = spawn_on_line(&network, 0.0);
        vehicle.advance(2000.0, &network);
        let at_stop = vehicle.position;
        vehicle.advance(2500.0, &network);
        assert_eq!(vehicle.position, at_stop);
        assert_eq!(at_stop, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn lane_offset_is_render_only() {
        let network = line_network();
        let mut vehicle = spawn_on_line(&network, 0.0);
        vehicle.advance(500.0, &network);
        let rendered = vehicle.render_position();
        assert_ne!(rendered, vehicle.position);
        // Heading east, route 1 -> lane 1 -> half a lane width below centre.
        assert!((rendered.x - vehicle.position.x).abs() < 1e-3);
        assert!(rendered.y < vehicle.position.y - 1.0);
        // The offset never leaks into logical arrival timing.
        let event = vehicle.advance(2000.0, &network);
        assert_eq!(event, Some(VehicleEvent::Arrived(2)));
    }

    #[test]
    fn missing_edge_degrades_to_finished_with_fault() {
        let network = line_network();
        // No 1 -> 3 edge exists.
        let mut vehicle = Vehicle::spawn(0, 1, [0, 0, 0], vec![1, 3], &network, 0.0);
        let event = vehicle.advance(16.0, &network);
        assert_eq!(
            event,
            Some(VehicleEvent::Completed {
                route_id: 1,
                fault: Some(RoutingFault::MissingEdge { from: 1, to: 3 }),
            })
        );
        assert!(vehicle.is_finished());
    }

    #[test]
    fn unknown_stop_degrades_to_finished_with_fault() {
        let network = line_network();
        let mut vehicle = Vehicle::spawn(0, 1, [0, 0, 0], vec![1, 99], &network, 0.0);
        let event = vehicle.advance(16.0, &network);
        assert_eq!(
            event,
            Some(VehicleEvent::Completed {
                route_id: 1,
                fault: Some(RoutingFault::UnknownStop(99)),
            })
        );
    }

    #[test]
    fn single_stop_path_goes_straight_to_final_dwell() {
        let network = line_network();
        let mut vehicle = Vehicle::spawn(0, 1, [0, 0, 0], vec![2], &network, 0.0);
        assert_eq!(vehicle.state, VehicleState::WaitingFinal);
        assert_eq!(vehicle.position, Vec2::new(100.0, 0.0));
        let event = vehicle.advance(2000.5, &network);
        assert_eq!(
            event,
            Some(VehicleEvent::Completed {
                route_id: 1,
                fault: None
            })
        );
    }

    #[test]
    fn completion_is_counted_once_and_vehicle_removed_same_tick() {
        let network = line_network();
        let mut fleet = FleetState::default();
        fleet.stop_run(); // ensure defaults
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        fleet.start_run(&network, &[], 0, &mut rng);
        fleet.spawn_vehicle(&network, 1, 0.0);
        assert_eq!(fleet.telemetry[&1].active, 1);

        // Run the whole trip with a coarse tick.
        let mut now = 0.0;
        let mut completions = 0;
        while !fleet.vehicles.is_empty() && now < 20_000.0 {
            now += 100.0;
            for event in fleet.advance_vehicles(now, &network) {
                if matches!(event, VehicleEvent::Completed { .. }) {
                    completions += 1;
                }
            }
        }
        assert_eq!(completions, 1);
        assert!(fleet.vehicles.is_empty());
        // Counted and removed in the same tick, never both states at once.
        assert_eq!(fleet.telemetry[&1].active, 0);
        assert_eq!(fleet.telemetry[&1].completed, 1);
    }

    #[test]
    fn run_spawns_exactly_the_scheduled_count() {
        let network = line_network();
        let mut fleet = FleetState::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let entries = [DispatchEntry {
            route_id: 1,
            allocated: 2,
            frequency_seconds: 10.0,
        }];
        fleet.start_run(&network, &entries, 20, &mut rng);
        assert_eq!(fleet.schedule.total_spawns(), 2);

        for second in 0..20 {
            fleet.spawn_due(&network, second, second as f64 * 1000.0);
        }
        assert_eq!(fleet.vehicles.len(), 2);
        // The schedule was consumed; replaying the seconds spawns nothing.
        for second in 0..20 {
            fleet.spawn_due(&network, second, 99_000.0);
        }
        assert_eq!(fleet.vehicles.len(), 2);
    }

    #[test]
    fn unknown_route_in_schedule_is_skipped() {
        let network = line_network();
        let mut fleet = FleetState::default();
        assert_eq!(fleet.spawn_vehicle(&network, 99, 0.0), None);
        assert!(fleet.vehicles.is_empty());
    }

    #[test]
    fn stop_run_clears_everything_at_once() {
        let network = line_network();
        let mut fleet = FleetState::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let entries = [DispatchEntry {
            route_id: 1,
            allocated: 5,
            frequency_seconds: 5.0,
        }];
        fleet.start_run(&network, &entries, 60, &mut rng);
        fleet.spawn_due(&network, fleet.schedule.seconds().next().unwrap(), 0.0);
        assert!(!fleet.vehicles.is_empty());

        fleet.stop_run();
        assert!(fleet.vehicles.is_empty());
        assert!(fleet.schedule.is_empty());
        assert!(fleet.is_idle());
        for telemetry in fleet.telemetry.values() {
            assert_eq!(telemetry.active, 0);
            assert_eq!(telemetry.completed, 0);
        }
    }

    #[test]
    fn telemetry_has_entries_for_idle_routes() {
        let network = Network::default();
        let mut fleet = FleetState::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        fleet.start_run(&network, &[], 10, &mut rng);
        assert_eq!(fleet.telemetry.len(), network.routes.len());
        for telemetry in fleet.telemetry.values() {
            assert_eq!(telemetry.active, 0);
            assert_eq!(telemetry.completed, 0);
        }
    }

    #[test]
    fn snapshots_expose_render_state_only() {
        let network = line_network();
        let mut fleet = FleetState::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        fleet.start_run(&network, &[], 0, &mut rng);
        fleet.spawn_vehicle(&network, 1, 0.0);
        fleet.advance_vehicles(1000.0, &network);

        let snapshots = fleet.snapshots();
        assert_eq!(snapshots.len(), 1);
        let snap = &snapshots[0];
        assert_eq!(snap.route_id, 1);
        assert_eq!(snap.color, [200, 40, 40]);
        assert_eq!(snap.x, fleet.vehicles[0].render_position().x);
    }
}
