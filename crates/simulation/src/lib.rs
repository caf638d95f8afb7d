//! Fleetmap dispatch & animation simulation engine.
//!
//! Visualizes a fixed transit network and animates vehicles along its
//! routes, either as a single manually-started trip or as a whole fleet
//! dispatched from a generated schedule.
//!
//! Two cadences drive everything:
//! - the **logical clock** (`FixedUpdate`, one simulated second per tick)
//!   is the sole trigger for consulting the dispatch schedule and spawning;
//! - the **render tick** (`Update`, once per frame) is the sole driver of
//!   curve interpolation, state transitions and telemetry.
//!
//! All mutable state lives in resources owned by this crate and is only
//! written inside those tick systems; collaborators read copy-out snapshots
//! and write through [`commands::SimCommand`].

use bevy::prelude::*;

pub mod allocation;
pub mod clock;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod fleet;
pub mod geometry;
pub mod graph;
pub mod manual;
pub mod network;
pub mod sim_rng;

pub use clock::SimClock;
pub use commands::SimCommand;
pub use fleet::{FleetState, RouteCompleted};
pub use manual::{ManualTrip, StopReached};
pub use network::Network;
pub use sim_rng::SimRng;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Network>()
            .init_resource::<SimRng>()
            .init_resource::<SimClock>()
            .init_resource::<FleetState>()
            .init_resource::<ManualTrip>()
            .add_event::<SimCommand>()
            .add_event::<RouteCompleted>()
            .add_event::<StopReached>()
            .insert_resource(Time::<Fixed>::from_seconds(config::LOGICAL_TICK_SECONDS))
            // Spawn before ticking so second 0 is honoured on the first tick.
            .add_systems(
                FixedUpdate,
                (fleet::spawn_scheduled, clock::tick_sim_clock).chain(),
            )
            .add_systems(
                Update,
                (
                    commands::apply_sim_commands,
                    fleet::advance_fleet,
                    manual::advance_manual_trip,
                )
                    .chain(),
            );
    }
}
