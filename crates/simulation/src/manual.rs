//! Manual single-trip mode: one synthetic vehicle driven over the shortest
//! path between two chosen stops.
//!
//! Shares the fleet's state machine but lives outside fleet telemetry; its
//! only output besides the rendered vehicle is a `StopReached` notification
//! per arrival, which external wait-count bookkeeping listens to.

use bevy::prelude::*;
use thiserror::Error;

use crate::fleet::types::{Vehicle, VehicleEvent};
use crate::graph::shortest_path;
use crate::network::{Network, StopId};

/// Vehicle id reserved for the manual trip so it can never collide with a
/// fleet vehicle.
pub const MANUAL_VEHICLE_ID: u32 = u32::MAX;

/// Display color of the manual vehicle.
const MANUAL_COLOR: [u8; 3] = [240, 240, 240];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TripError {
    #[error("no path exists from stop {from} to stop {to}")]
    Unreachable { from: StopId, to: StopId },
    #[error("unknown stop {0}")]
    UnknownStop(StopId),
}

/// At most one manual trip exists at a time; starting a new one replaces it.
#[derive(Resource, Debug, Default)]
pub struct ManualTrip {
    pub vehicle: Option<Vehicle>,
}

impl ManualTrip {
    /// Start a trip from `from` to `to`, rejecting unknown or unreachable
    /// stops with a typed error and leaving any current trip untouched.
    pub fn start(
        &mut self,
        network: &Network,
        from: StopId,
        to: StopId,
        now_ms: f64,
    ) -> Result<(), TripError> {
        network.stop(from).ok_or(TripError::UnknownStop(from))?;
        network.stop(to).ok_or(TripError::UnknownStop(to))?;
        let path = shortest_path(from, to, network).ok_or(TripError::Unreachable { from, to })?;
        self.vehicle = Some(Vehicle::spawn(
            MANUAL_VEHICLE_ID,
            0,
            MANUAL_COLOR,
            path,
            network,
            now_ms,
        ));
        Ok(())
    }

    pub fn clear(&mut self) {
        self.vehicle = None;
    }

    pub fn is_active(&self) -> bool {
        self.vehicle.is_some()
    }
}

/// One-way notification that the manual vehicle reached a stop, carrying
/// the stop's short code label.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct StopReached {
    pub label: String,
}

/// System (`Update`): advance the manual vehicle and publish arrivals.
pub fn advance_manual_trip(
    time: Res<Time>,
    network: Res<Network>,
    mut manual: ResMut<ManualTrip>,
    mut reached: EventWriter<StopReached>,
) {
    let Some(vehicle) = manual.vehicle.as_mut() else {
        return;
    };
    let now_ms = time.elapsed_secs_f64() * 1000.0;
    match vehicle.advance(now_ms, &network) {
        Some(VehicleEvent::Arrived(stop_id)) => {
            if let Some(stop) = network.stop(stop_id) {
                reached.send(StopReached {
                    label: stop.code.clone(),
                });
            }
        }
        Some(VehicleEvent::Completed { fault, .. }) => {
            if let Some(fault) = fault {
                warn!("manual trip aborted: {fault:?}");
            }
            manual.clear();
        }
        None => {}
    }
}
