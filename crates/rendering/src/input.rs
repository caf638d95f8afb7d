//! Keyboard glue standing in for the out-of-scope UI chrome.
//!
//! Space     start/stop a dispatch run over a demo allocation
//! M         start a manual trip from the depot to the far harbour terminal
//! Escape    cancel the manual trip

use std::collections::HashMap;

use bevy::prelude::*;

use simulation::allocation::allocate_fleet;
use simulation::dispatch::DispatchEntry;
use simulation::network::StopId;
use simulation::{Network, SimClock, SimCommand};

/// Demo run parameters, in lieu of the external crowd predictor.
const DEMO_FLEET: u32 = 14;
const DEMO_HORIZON_SECONDS: u32 = 120;

/// Synthetic per-stop crowd counts used for the demo allocation.
fn demo_crowds(network: &Network) -> HashMap<StopId, u32> {
    network
        .stops
        .iter()
        .map(|stop| {
            // Busier toward the depot side of the map.
            let crowd = 10 + ((stop.x.abs() / 40.0) as u32) * 5;
            (stop.id, crowd)
        })
        .collect()
}

pub fn keyboard_commands(
    keys: Res<ButtonInput<KeyCode>>,
    network: Res<Network>,
    clock: Res<SimClock>,
    mut commands: EventWriter<SimCommand>,
) {
    if keys.just_pressed(KeyCode::Space) {
        if clock.running {
            commands.send(SimCommand::StopRun);
        } else {
            match allocate_fleet(
                &network,
                &demo_crowds(&network),
                DEMO_FLEET,
                DEMO_HORIZON_SECONDS,
            ) {
                Ok(plan) => {
                    let entries: Vec<DispatchEntry> =
                        plan.routes.iter().map(DispatchEntry::from_plan).collect();
                    info!(
                        "demo plan: {} buses out, {} saved",
                        entries.iter().map(|e| e.allocated).sum::<u32>(),
                        plan.saved_buses
                    );
                    commands.send(SimCommand::StartRun {
                        entries,
                        horizon_seconds: DEMO_HORIZON_SECONDS,
                        seed: None,
                    });
                }
                Err(err) => warn!("demo allocation failed: {err}"),
            }
        }
    }

    if keys.just_pressed(KeyCode::KeyM) {
        let (Some(from), Some(to)) = (network.stop_by_code("B1"), network.stop_by_code("B9"))
        else {
            return;
        };
        commands.send(SimCommand::StartManualTrip {
            from: from.id,
            to: to.id,
        });
    }

    if keys.just_pressed(KeyCode::Escape) {
        commands.send(SimCommand::StopManualTrip);
    }
}
