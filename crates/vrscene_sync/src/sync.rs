//! Sync pass: PhysicsObjects → visual Transform
//!
//! Первый шаг каждого tick. Только mapped snapshots; unmapped id и
//! despawned entities пропускаются молча.

use bevy::prelude::*;

use crate::physics::PhysicsObjects;
use crate::registry::PhysicsRegistry;

/// Wall clock текущего кадра (ms, epoch). Effects анимируются от него.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    pub now_ms: f64,
    /// Номер tick'а (0 до первого tick)
    pub frame: u64,
}

/// Копирует position (и quaternion если есть) в mapped visual nodes
pub fn sync_physics_to_visuals(
    objects: Res<PhysicsObjects>,
    registry: Res<PhysicsRegistry>,
    mut transforms: Query<&mut Transform>,
) {
    for object in objects.iter() {
        let Some(visual) = registry.get(&object.id) else {
            continue;
        };

        let Ok(mut transform) = transforms.get_mut(visual) else {
            continue;
        };

        transform.translation = object.translation();
        // Нулевой quaternion (битые данные) не трогает rotation
        if let Some(rotation) = object.rotation().filter(|q| q.length_squared() > f32::EPSILON) {
            transform.rotation = rotation.normalize();
        }
    }
}
