use bevy::prelude::*;

use rendering::RenderingPlugin;
use simulation::SimulationPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Fleetmap".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins((SimulationPlugin, RenderingPlugin))
        .run();
}
