//! Draws the static network: curved edges as gizmo polylines, stop discs
//! colored by category, and stop code labels.

use bevy::prelude::*;

use simulation::geometry::{control_point, curve_point};
use simulation::network::StopKind;
use simulation::Network;

/// Samples per edge polyline.
const CURVE_SEGMENTS: u32 = 24;

const STOP_RADIUS: f32 = 10.0;
const EDGE_COLOR: Color = Color::srgb(0.45, 0.45, 0.5);

fn stop_color(kind: StopKind) -> Color {
    match kind {
        StopKind::Terminal => Color::srgb(0.85, 0.3, 0.25),
        StopKind::Stop => Color::srgb(0.35, 0.55, 0.9),
        StopKind::Hub => Color::srgb(0.95, 0.75, 0.2),
    }
}

/// System (`Update`): redraw edges and stop discs each frame.
pub fn draw_network(network: Res<Network>, mut gizmos: Gizmos) {
    for edge in &network.edges {
        let (Some(from), Some(to)) = (network.stop(edge.from), network.stop(edge.to)) else {
            continue;
        };
        let p0 = from.position();
        let p2 = to.position();
        let p1 = control_point(p0, p2, edge.curve_offset());
        let points: Vec<Vec2> = (0..=CURVE_SEGMENTS)
            .map(|i| curve_point(i as f32 / CURVE_SEGMENTS as f32, p0, p1, p2))
            .collect();
        gizmos.linestrip_2d(points, EDGE_COLOR);
    }

    for stop in &network.stops {
        gizmos.circle_2d(stop.position(), STOP_RADIUS, stop_color(stop.kind));
    }
}

/// System (`Startup`): spawn a text label above each stop.
pub fn spawn_stop_labels(mut commands: Commands, network: Res<Network>) {
    for stop in &network.stops {
        commands.spawn((
            Text2d::new(stop.code.clone()),
            TextFont {
                font_size: 14.0,
                ..default()
            },
            TextColor(Color::WHITE),
            Transform::from_translation((stop.position() + Vec2::new(0.0, 22.0)).extend(1.0)),
        ));
    }
}
