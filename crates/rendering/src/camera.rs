use bevy::prelude::*;

use simulation::Network;

/// Extra world units kept visible around the network's bounding box.
const VIEW_MARGIN: f32 = 120.0;

/// Spawn a 2D camera centred on the network.
pub fn setup_camera(mut commands: Commands, network: Res<Network>, windows: Query<&Window>) {
    let (min, max) = network.bounds();
    let center = (min + max) / 2.0;

    // Zoom so the whole map fits regardless of window size.
    let span = (max - min) + Vec2::splat(VIEW_MARGIN * 2.0);
    let scale = windows
        .get_single()
        .map(|window| {
            let fit_x = span.x / window.width().max(1.0);
            let fit_y = span.y / window.height().max(1.0);
            fit_x.max(fit_y).max(0.1)
        })
        .unwrap_or(1.0);

    commands.spawn((
        Camera2d,
        Transform::from_translation(center.extend(0.0)),
        OrthographicProjection {
            scale,
            ..OrthographicProjection::default_2d()
        },
    ));
}
