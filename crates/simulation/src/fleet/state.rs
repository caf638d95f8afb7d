//! The fleet run state: active vehicles, the current dispatch schedule and
//! per-route telemetry, owned by a single resource and mutated only from
//! the tick systems.

use std::collections::BTreeMap;

use bevy::prelude::*;
use rand::Rng;

use super::types::{RouteTelemetry, Vehicle, VehicleEvent, VehicleSnapshot};
use crate::dispatch::{build_schedule, DispatchEntry, DispatchSchedule};
use crate::network::{Network, RouteId};

#[derive(Resource, Debug, Default)]
pub struct FleetState {
    pub vehicles: Vec<Vehicle>,
    pub schedule: DispatchSchedule,
    /// Keyed by route id, with zero-valued entries for every known route so
    /// consumers never have to special-case "no data yet".
    pub telemetry: BTreeMap<RouteId, RouteTelemetry>,
    next_vehicle_id: u32,
}

impl FleetState {
    /// Start a new run: build the dispatch schedule from the plan entries
    /// and reset vehicles and telemetry in one step.
    pub fn start_run(
        &mut self,
        network: &Network,
        entries: &[DispatchEntry],
        horizon_seconds: u32,
        rng: &mut impl Rng,
    ) {
        self.vehicles.clear();
        self.next_vehicle_id = 0;
        self.schedule = build_schedule(entries, horizon_seconds, rng);
        self.reset_telemetry(network);
        info!(
            "run started: {} spawns scheduled over {}s across {} routes",
            self.schedule.total_spawns(),
            horizon_seconds,
            entries.len()
        );
    }

    /// Atomically end the run: no vehicle, schedule entry or counter
    /// survives, so a stale schedule can never be evaluated afterwards.
    pub fn stop_run(&mut self) {
        self.vehicles.clear();
        self.schedule = DispatchSchedule::default();
        for telemetry in self.telemetry.values_mut() {
            *telemetry = RouteTelemetry::default();
        }
    }

    fn reset_telemetry(&mut self, network: &Network) {
        self.telemetry = network
            .routes
            .iter()
            .map(|r| (r.id, RouteTelemetry::default()))
            .collect();
    }

    /// Spawn every vehicle the schedule lists for `second`. Routes whose
    /// definition has vanished or is empty are skipped with a warning; one
    /// bad route must not stop the rest of the fleet.
    pub fn spawn_due(&mut self, network: &Network, second: u32, now_ms: f64) {
        let due = self.schedule.take_at(second);
        for route_id in due {
            self.spawn_vehicle(network, route_id, now_ms);
        }
    }

    /// Spawn one vehicle on `route_id`, returning its id.
    pub fn spawn_vehicle(
        &mut self,
        network: &Network,
        route_id: RouteId,
        now_ms: f64,
    ) -> Option<u32> {
        let Some(route) = network.route(route_id) else {
            warn!("scheduled spawn for unknown route {route_id}, skipping");
            return None;
        };
        if route.stop_ids.is_empty() {
            warn!("route {route_id} has no stops, skipping spawn");
            return None;
        }
        let id = self.next_vehicle_id;
        self.next_vehicle_id += 1;
        self.vehicles.push(Vehicle::spawn(
            id,
            route_id,
            route.color,
            route.stop_ids.clone(),
            network,
            now_ms,
        ));
        if let Some(telemetry) = self.telemetry.get_mut(&route_id) {
            telemetry.active += 1;
        }
        Some(id)
    }

    /// Advance every vehicle to `now_ms`, fold completions into telemetry,
    /// and drop finished vehicles in the same tick their completion is
    /// counted. Returns the tick's events for downstream consumers.
    pub fn advance_vehicles(&mut self, now_ms: f64, network: &Network) -> Vec<VehicleEvent> {
        let mut events = Vec::new();
        for vehicle in &mut self.vehicles {
            if let Some(event) = vehicle.advance(now_ms, network) {
                if let VehicleEvent::Completed { route_id, fault } = &event {
                    if let Some(f) = fault {
                        warn!("vehicle {} on route {route_id} aborted: {f:?}", vehicle.id);
                    }
                    if let Some(telemetry) = self.telemetry.get_mut(route_id) {
                        telemetry.completed += 1;
                    }
                }
                events.push(event);
            }
        }
        self.vehicles.retain(|v| !v.is_finished());

        // Recompute the point-in-time active counts from the surviving set.
        for telemetry in self.telemetry.values_mut() {
            telemetry.active = 0;
        }
        for vehicle in &self.vehicles {
            if let Some(telemetry) = self.telemetry.get_mut(&vehicle.route_id) {
                telemetry.active += 1;
            }
        }
        events
    }

    /// Copy-out of every active vehicle's visual state for the renderer.
    pub fn snapshots(&self) -> Vec<VehicleSnapshot> {
        self.vehicles.iter().map(Vehicle::snapshot).collect()
    }

    /// True once the schedule is exhausted and no vehicle is still out.
    pub fn is_idle(&self) -> bool {
        self.vehicles.is_empty() && self.schedule.is_empty()
    }
}
