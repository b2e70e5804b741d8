//! Ground query: ray cast вниз для позиции камеры над поверхностью

use bevy::prelude::*;

use vrscene_sync::{log_warning, world_transform, SceneError, SceneResult};

use crate::geometry::SceneMesh;

/// Дальность ray вниз (near 0)
pub const GROUND_RAY_LENGTH: f32 = 20.0;

/// Позиция камеры над поверхностью под `point`.
///
/// Returns:
/// - `Ok(hit + (0, camera_height, 0))` для ближайшего попадания
/// - `Err(SceneError::NoHitBelow)` если под точкой ничего нет (в пределах 20m)
///
/// # Implementation
///
/// - Ray из `point` строго вниз (-Y), solid
/// - Проверяются только переданные `objects` (без обхода детей)
/// - Collider строится из SceneMesh geometry в world масштабе (Rapier shape query,
///   без physics pipeline)
/// - Объект без SceneMesh или с битой geometry пропускается
pub fn camera_position_above(
    world: &World,
    point: Vec3,
    camera_height: f32,
    objects: &[Entity],
) -> SceneResult<Vec3> {
    let nearest = objects
        .iter()
        .filter_map(|&entity| cast_down(world, entity, point))
        .min_by(|a, b| a.total_cmp(b));

    let Some(distance) = nearest else {
        return Err(SceneError::NoHitBelow);
    };

    let mut hit = point + Vec3::NEG_Y * distance;
    hit.y += camera_height;
    Ok(hit)
}

fn cast_down(world: &World, entity: Entity, point: Vec3) -> Option<f32> {
    let mesh = world.get::<SceneMesh>(entity)?;
    let (scale, rotation, translation) = world_transform(world, entity)?.to_scale_rotation_translation();

    let collider = match mesh.geometry.collider(scale) {
        Ok(collider) => collider,
        Err(err) => {
            log_warning(&format!("Ground query: {:?} skipped ({})", entity, err));
            return None;
        }
    };

    collider.cast_ray(translation, rotation, point, Vec3::NEG_Y, GROUND_RAY_LENGTH, true)
}
