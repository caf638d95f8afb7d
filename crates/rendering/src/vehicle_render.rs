//! One sprite per active vehicle, diffed against the engine's per-frame
//! snapshots: new ids spawn a sprite, known ids are repositioned, vanished
//! ids are despawned.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use simulation::fleet::VehicleSnapshot;
use simulation::{FleetState, ManualTrip};

const VEHICLE_SIZE: Vec2 = Vec2::new(20.0, 10.0);
/// Vehicles render above edges and stop discs.
const VEHICLE_Z: f32 = 2.0;

/// Maps vehicle ids to their sprite entities.
#[derive(Resource, Default)]
pub struct VehicleSprites {
    by_id: HashMap<u32, Entity>,
}

/// System (`Update`): sync sprites with the current snapshot set.
pub fn sync_vehicle_sprites(
    mut commands: Commands,
    fleet: Res<FleetState>,
    manual: Res<ManualTrip>,
    mut sprites: ResMut<VehicleSprites>,
    mut transforms: Query<&mut Transform>,
) {
    let mut snapshots: Vec<VehicleSnapshot> = fleet.snapshots();
    if let Some(vehicle) = &manual.vehicle {
        snapshots.push(vehicle.snapshot());
    }

    let mut seen: HashSet<u32> = HashSet::with_capacity(snapshots.len());
    for snap in &snapshots {
        seen.insert(snap.id);
        let translation = Vec3::new(snap.x, snap.y, VEHICLE_Z);
        let rotation = Quat::from_rotation_z(snap.rotation_degrees.to_radians());
        match sprites.by_id.get(&snap.id) {
            Some(&entity) => {
                if let Ok(mut transform) = transforms.get_mut(entity) {
                    transform.translation = translation;
                    transform.rotation = rotation;
                }
            }
            None => {
                let entity = commands
                    .spawn((
                        Sprite::from_color(
                            Color::srgb_u8(snap.color[0], snap.color[1], snap.color[2]),
                            VEHICLE_SIZE,
                        ),
                        Transform {
                            translation,
                            rotation,
                            ..default()
                        },
                    ))
                    .id();
                sprites.by_id.insert(snap.id, entity);
            }
        }
    }

    // Despawn sprites whose vehicle completed or was cleared this frame.
    sprites.by_id.retain(|id, entity| {
        if seen.contains(id) {
            true
        } else {
            commands.entity(*entity).despawn();
            false
        }
    });
}
