//! Rendering surface for the dispatch simulation.
//!
//! Strictly a consumer of engine snapshots: the network is drawn from the
//! immutable `Network` resource, vehicles from per-frame
//! `VehicleSnapshot`s, and all writes back into the engine go through
//! `SimCommand` events emitted by the keyboard glue in [`input`].

use bevy::prelude::*;

pub mod camera;
pub mod input;
pub mod network_render;
pub mod vehicle_render;

use vehicle_render::VehicleSprites;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VehicleSprites>()
            .add_systems(Startup, (camera::setup_camera, network_render::spawn_stop_labels))
            .add_systems(
                Update,
                (
                    input::keyboard_commands,
                    network_render::draw_network,
                    vehicle_render::sync_vehicle_sprites,
                ),
            );
    }
}
