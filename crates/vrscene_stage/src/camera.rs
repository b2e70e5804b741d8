//! Camera rig: perspective камера + HUD layer
//!
//! Камера - child scene root (объекты, прикреплённые к камере, рендерятся
//! вместе со сценой). HUD - child камеры, чуть впереди и уменьшен.

use bevy::prelude::*;
use std::f32::consts::PI;

use vrscene_sync::CameraLens;

use crate::config::StageConfig;

/// Камера stage (height - уровень глаз для ground query)
#[derive(Component, Debug, Clone, Copy)]
#[require(Transform)]
pub struct StageCamera {
    pub height: f32,
}

/// HUD layer (child камеры)
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(Transform)]
pub struct Hud;

#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    pub camera: Entity,
    pub hud: Entity,
}

/// Начальная ориентация: look at (0, height, target_z), затем +π по Y (Euler XYZ)
pub fn initial_camera_rotation(height: f32, target_z: f32) -> Quat {
    let looking = Transform::default().looking_at(Vec3::new(0.0, height, target_z), Vec3::Y);
    let (x, y, z) = looking.rotation.to_euler(EulerRot::XYZ);
    Quat::from_euler(EulerRot::XYZ, x, y + PI, z)
}

pub fn spawn_camera_rig(world: &mut World, config: &StageConfig, scene_root: Entity) -> CameraRig {
    let camera_config = config.camera;

    let camera = world
        .spawn((
            Name::new("Camera"),
            StageCamera { height: camera_config.height },
            CameraLens {
                fov_degrees: camera_config.fov_degrees,
                aspect: config.viewport.aspect(),
                near: camera_config.near,
                far: camera_config.far,
            },
            Transform::from_rotation(initial_camera_rotation(camera_config.height, camera_config.look_target_z)),
            ChildOf(scene_root),
        ))
        .id();

    let hud = world
        .spawn((
            Name::new("Hud"),
            Hud,
            Transform::from_translation(Vec3::from_array(config.hud.offset))
                .with_scale(Vec3::splat(config.hud.scale)),
            ChildOf(camera),
        ))
        .id();

    CameraRig { camera, hud }
}
