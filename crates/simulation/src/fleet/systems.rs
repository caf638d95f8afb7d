//! ECS systems driving the fleet.
//!
//! Spawning runs on `FixedUpdate`, triggered only by the logical clock;
//! continuous advancement and telemetry run on `Update`, once per render
//! frame. Both mutate the single `FleetState` resource, and Bevy runs each
//! system to completion, so no tick ever observes half-updated state.

use bevy::prelude::*;

use super::state::FleetState;
use super::types::{RoutingFault, VehicleEvent};
use crate::clock::SimClock;
use crate::network::{Network, RouteId};

/// Completion notification for telemetry consumers, emitted once per
/// vehicle that reaches `Finished`.
#[derive(Event, Debug, Clone)]
pub struct RouteCompleted {
    pub route_id: RouteId,
    /// `Some` when the trip ended through a routing fault rather than a
    /// genuine arrival.
    pub fault: Option<RoutingFault>,
}

/// System (`FixedUpdate`): spawn the vehicles scheduled for the current
/// logical second. Runs before the clock ticks so second 0 is honoured.
pub fn spawn_scheduled(
    time: Res<Time>,
    clock: Res<SimClock>,
    network: Res<Network>,
    mut fleet: ResMut<FleetState>,
) {
    if !clock.running {
        return;
    }
    let now_ms = time.elapsed_secs_f64() * 1000.0;
    fleet.spawn_due(&network, clock.second, now_ms);
}

/// System (`Update`): advance every vehicle one render tick and emit
/// completion events.
pub fn advance_fleet(
    time: Res<Time>,
    network: Res<Network>,
    mut fleet: ResMut<FleetState>,
    mut completions: EventWriter<RouteCompleted>,
) {
    if fleet.vehicles.is_empty() {
        return;
    }
    let now_ms = time.elapsed_secs_f64() * 1000.0;
    for event in fleet.advance_vehicles(now_ms, &network) {
        if let VehicleEvent::Completed { route_id, fault } = event {
            completions.send(RouteCompleted { route_id, fault });
        }
    }
}
