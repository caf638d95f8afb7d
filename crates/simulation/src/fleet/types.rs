//! Data types for the vehicle fleet, including the per-vehicle state machine.

use bevy::prelude::*;

use crate::config::{FINAL_DWELL_MS, LANE_COUNT, SEGMENT_TRAVEL_MS, STOP_DWELL_MS};
use crate::geometry::{control_point, curve_heading_degrees, curve_point, lane_offset};
use crate::network::{Network, RouteId, StopId};

/// Lifecycle state of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleState {
    /// Traversing the current segment.
    Moving,
    /// Dwelling at an intermediate stop.
    Waiting,
    /// Dwelling at the terminal stop before completing.
    WaitingFinal,
    /// Absorbing; the vehicle is removed in the same tick.
    Finished,
}

/// Why a vehicle was aborted mid-flight. A malformed route degrades that one
/// vehicle to immediate completion instead of crashing the run; the fault
/// reason lets telemetry consumers tell a real trip from a routing fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingFault {
    MissingEdge { from: StopId, to: StopId },
    UnknownStop(StopId),
}

/// Emitted by [`Vehicle::advance`]; at most one per vehicle per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleEvent {
    /// The vehicle reached a stop (intermediate or terminal).
    Arrived(StopId),
    /// The vehicle entered `Finished`, cleanly or through a fault.
    Completed {
        route_id: RouteId,
        fault: Option<RoutingFault>,
    },
}

/// Renderer-facing copy of a vehicle's visual state. External collaborators
/// only ever see these snapshots, never the live vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSnapshot {
    pub id: u32,
    pub route_id: RouteId,
    pub color: [u8; 3],
    pub x: f32,
    pub y: f32,
    pub rotation_degrees: f32,
}

/// Live per-route counters: point-in-time active vehicles and a cumulative,
/// never-decreasing completion count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteTelemetry {
    pub active: u32,
    pub completed: u64,
}

/// A vehicle progressing along a route's stop sequence.
///
/// The stop sequence is copied at spawn so later route edits never affect a
/// vehicle already in flight. Owned exclusively by the simulation engine.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: u32,
    pub route_id: RouteId,
    pub color: [u8; 3],
    pub path: Vec<StopId>,
    /// Index of the segment currently travelled; always `< path.len() - 1`
    /// while moving or waiting at an intermediate stop.
    pub leg: usize,
    pub state: VehicleState,
    /// Wall-clock milliseconds of the last state transition.
    pub state_since_ms: f64,
    /// Logical position on the curve; the lane offset is applied on top of
    /// this only when rendering.
    pub position: Vec2,
    pub heading_degrees: f32,
    pub fault: Option<RoutingFault>,
}

impl Vehicle {
    /// Spawn a vehicle at the first stop of `path`.
    ///
    /// A single-stop path has no segment to travel, so the vehicle starts
    /// directly in its terminal dwell.
    pub fn spawn(
        id: u32,
        route_id: RouteId,
        color: [u8; 3],
        path: Vec<StopId>,
        network: &Network,
        now_ms: f64,
    ) -> Self {
        let position = path
            .first()
            .and_then(|&stop| network.stop(stop))
            .map(|stop| stop.position())
            .unwrap_or_default();
        let state = if path.len() < 2 {
            VehicleState::WaitingFinal
        } else {
            VehicleState::Moving
        };
        Self {
            id,
            route_id,
            color,
            path,
            leg: 0,
            state,
            state_since_ms: now_ms,
            position,
            heading_degrees: 0.0,
            fault: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == VehicleState::Finished
    }

    /// Render lane for this vehicle, derived from its route.
    pub fn lane_index(&self) -> u32 {
        self.route_id % LANE_COUNT
    }

    /// Position shown on screen: logical position plus the cosmetic lane
    /// offset. Never feeds back into state transitions or timing.
    pub fn render_position(&self) -> Vec2 {
        self.position + lane_offset(self.heading_degrees, self.lane_index())
    }

    pub fn snapshot(&self) -> VehicleSnapshot {
        let rendered = self.render_position();
        VehicleSnapshot {
            id: self.id,
            route_id: self.route_id,
            color: self.color,
            x: rendered.x,
            y: rendered.y,
            rotation_degrees: self.heading_degrees,
        }
    }

    /// Abort mid-flight on a malformed route: degrade straight to
    /// `Finished`, carrying the fault reason.
    fn abort(&mut self, fault: RoutingFault) -> VehicleEvent {
        self.fault = Some(fault);
        self.state = VehicleState::Finished;
        VehicleEvent::Completed {
            route_id: self.route_id,
            fault: Some(fault),
        }
    }

    /// Advance the state machine to wall-clock time `now_ms`.
    ///
    /// Called once per render tick. While moving, progress is
    /// `t = min(elapsed / SEGMENT_TRAVEL_MS, 1)` over the quadratic arc of
    /// the current segment; every segment takes the same wall-clock time
    /// regardless of drawn length. While waiting, the position stays frozen
    /// at the arrival point until the dwell elapses.
    pub fn advance(&mut self, now_ms: f64, network: &Network) -> Option<VehicleEvent> {
        match self.state {
            VehicleState::Finished => None,
            VehicleState::Moving => {
                let (Some(&from_id), Some(&to_id)) =
                    (self.path.get(self.leg), self.path.get(self.leg + 1))
                else {
                    // Out-of-range leg means the path was malformed at spawn.
                    let last = self.path.last().copied().unwrap_or_default();
                    return Some(self.abort(RoutingFault::UnknownStop(last)));
                };
                let Some(from) = network.stop(from_id) else {
                    return Some(self.abort(RoutingFault::UnknownStop(from_id)));
                };
                let Some(to) = network.stop(to_id) else {
                    return Some(self.abort(RoutingFault::UnknownStop(to_id)));
                };
                let Some(edge) = network.edge_between(from_id, to_id) else {
                    return Some(self.abort(RoutingFault::MissingEdge {
                        from: from_id,
                        to: to_id,
                    }));
                };

                let elapsed = now_ms - self.state_since_ms;
                let t = (elapsed / SEGMENT_TRAVEL_MS).min(1.0) as f32;
                let ctrl = control_point(from.position(), to.position(), edge.curve_offset());
                self.position = curve_point(t, from.position(), ctrl, to.position());
                self.heading_degrees =
                    curve_heading_degrees(t, from.position(), ctrl, to.position());

                if t >= 1.0 {
                    self.state = if self.leg + 2 >= self.path.len() {
                        VehicleState::WaitingFinal
                    } else {
                        VehicleState::Waiting
                    };
                    self.state_since_ms = now_ms;
                    return Some(VehicleEvent::Arrived(to_id));
                }
                None
            }
            VehicleState::Waiting => {
                if now_ms - self.state_since_ms > STOP_DWELL_MS {
                    self.leg += 1;
                    self.state = VehicleState::Moving;
                    self.state_since_ms = now_ms;
                }
                None
            }
            VehicleState::WaitingFinal => {
                if now_ms - self.state_since_ms > FINAL_DWELL_MS {
                    self.state = VehicleState::Finished;
                    return Some(VehicleEvent::Completed {
                        route_id: self.route_id,
                        fault: None,
                    });
                }
                None
            }
        }
    }
}
