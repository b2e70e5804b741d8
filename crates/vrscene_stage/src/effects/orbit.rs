//! Orbit controls: drag → yaw/pitch, wheel → distance
//!
//! Input приходит от host через OrbitInput resource (накапливается между
//! tick'ами, потребляется callback'ом).

use bevy::prelude::*;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6};

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.1;
const MIN_DISTANCE: f32 = 3.0;
const MAX_DISTANCE: f32 = 50.0;

#[derive(Component, Debug, Clone, Copy)]
#[require(Transform)]
pub struct OrbitControls {
    pub focus: Vec3,
    pub distance: f32,
    /// Горизонтальный угол (радианы)
    pub yaw: f32,
    /// Вертикальный угол (радианы)
    pub pitch: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            distance: 15.0,
            yaw: FRAC_PI_4,
            pitch: FRAC_PI_6,
            sensitivity: 0.005,
            zoom_speed: 1.0,
        }
    }
}

impl OrbitControls {
    /// Сферические координаты вокруг focus
    pub fn eye_position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.focus + Vec3::new(x, y, z)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye_position()).looking_at(self.focus, Vec3::Y)
    }
}

/// Накопленный input с прошлого tick
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitInput {
    /// Drag в пикселях
    pub drag: Vec2,
    /// Wheel в "строках" (+ - приблизить)
    pub wheel: f32,
}

impl OrbitInput {
    pub fn drag(&mut self, delta: Vec2) {
        self.drag += delta;
    }

    pub fn scroll(&mut self, lines: f32) {
        self.wheel += lines;
    }
}

pub fn orbit_camera_controls(
    mut input: ResMut<OrbitInput>,
    mut cameras: Query<(&mut OrbitControls, &mut Transform)>,
) {
    let OrbitInput { drag, wheel } = std::mem::take(&mut *input);

    for (mut controls, mut transform) in cameras.iter_mut() {
        controls.yaw -= drag.x * controls.sensitivity;
        controls.pitch = (controls.pitch - drag.y * controls.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        controls.distance = (controls.distance - wheel * controls.zoom_speed).clamp(MIN_DISTANCE, MAX_DISTANCE);

        *transform = controls.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_looks_at_focus() {
        let controls = OrbitControls {
            focus: Vec3::new(1.0, 0.0, 0.0),
            ..default()
        };
        let transform = controls.transform();
        assert!(((transform.translation - controls.focus).length() - controls.distance).abs() < 1e-4);

        let forward = transform.rotation * Vec3::NEG_Z;
        let to_focus = (controls.focus - transform.translation).normalize();
        assert!(forward.dot(to_focus) > 0.9999);
    }

    #[test]
    fn test_input_consumed_and_clamped() {
        let mut world = World::new();
        world.init_resource::<OrbitInput>();
        let camera = world.spawn(OrbitControls::default()).id();

        {
            let mut input = world.resource_mut::<OrbitInput>();
            input.drag(Vec2::new(0.0, -10_000.0));
            input.scroll(100.0);
        }
        world.run_system_cached(orbit_camera_controls).unwrap();

        let controls = world.get::<OrbitControls>(camera).unwrap();
        assert_eq!(controls.pitch, PITCH_LIMIT);
        assert_eq!(controls.distance, MIN_DISTANCE);
        assert_eq!(*world.resource::<OrbitInput>(), OrbitInput::default());
    }
}
