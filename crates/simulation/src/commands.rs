//! The engine's single write surface.
//!
//! External collaborators (input handling, UI) never touch the simulation
//! resources directly; they emit `SimCommand` events and read snapshots. A
//! rejected command is logged and leaves all prior state untouched.

use bevy::prelude::*;

use crate::clock::SimClock;
use crate::dispatch::DispatchEntry;
use crate::fleet::FleetState;
use crate::manual::ManualTrip;
use crate::network::{Network, StopId};
use crate::sim_rng::SimRng;

#[derive(Event, Debug, Clone)]
pub enum SimCommand {
    /// Begin a dispatch run over the given plan.
    StartRun {
        entries: Vec<DispatchEntry>,
        horizon_seconds: u32,
        /// Reseed the simulation RNG for a reproducible schedule.
        seed: Option<u64>,
    },
    /// Atomically end the current run.
    StopRun,
    /// Drive a single vehicle over the shortest path between two stops.
    StartManualTrip { from: StopId, to: StopId },
    StopManualTrip,
}

pub fn apply_sim_commands(
    mut commands: EventReader<SimCommand>,
    time: Res<Time>,
    network: Res<Network>,
    mut fleet: ResMut<FleetState>,
    mut clock: ResMut<SimClock>,
    mut rng: ResMut<SimRng>,
    mut manual: ResMut<ManualTrip>,
) {
    for command in commands.read() {
        match command {
            SimCommand::StartRun {
                entries,
                horizon_seconds,
                seed,
            } => {
                if let Some(seed) = seed {
                    *rng = SimRng::from_seed_u64(*seed);
                }
                fleet.start_run(&network, entries, *horizon_seconds, &mut rng.0);
                clock.start(*horizon_seconds);
            }
            SimCommand::StopRun => {
                fleet.stop_run();
                clock.stop();
                info!("run stopped");
            }
            SimCommand::StartManualTrip { from, to } => {
                let now_ms = time.elapsed_secs_f64() * 1000.0;
                match manual.start(&network, *from, *to, now_ms) {
                    Ok(()) => info!("manual trip started: stop {from} -> stop {to}"),
                    Err(err) => warn!("manual trip rejected: {err}"),
                }
            }
            SimCommand::StopManualTrip => manual.clear(),
        }
    }
}
