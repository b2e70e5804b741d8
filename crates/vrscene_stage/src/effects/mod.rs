//! Per-frame effects: каждый регистрирует один tick callback
//!
//! - stars: star shell point cloud, вращение от wall clock
//! - dust: две dust point cloud'ы, scroll по Y с wrap
//! - metaballs: marching cubes scalar field от physics "point" объектов
//! - fog: scene fog + clear color
//! - tween: camera walk tweens (quadratic ease-out)
//! - orientation: device orientation → camera rotation
//! - orbit: orbit controls (drag/wheel → camera)

pub mod dust;
pub mod fog;
pub mod metaballs;
pub mod orbit;
pub mod orientation;
pub mod stars;
pub mod tween;

pub use dust::{dust_scroll, scroll_dust, spawn_dust, DustLayer};
pub use fog::SceneFog;
pub use metaballs::{spawn_metaballs, update_metaballs, MetaballField, MetaballLayer, MetaballRig};
pub use orbit::{orbit_camera_controls, OrbitControls, OrbitInput};
pub use orientation::{
    orientation_quat, update_device_orientation, DeviceOrientationController, DeviceOrientationReading,
    InputElement,
};
pub use stars::{rotate_star_fields, spawn_star_field, star_rotation, StarField};
pub use tween::{update_tweens, Easing, Tween, Tweens};

use bevy::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

use vrscene_sync::Drawable;

/// Point cloud (particles). Points шарятся между clouds через Arc.
#[derive(Component, Debug, Clone)]
#[require(Transform, Drawable)]
pub struct PointCloud {
    pub points: Arc<[Vec3]>,
    pub size: f32,
    pub texture: PathBuf,
    pub opacity: f32,
    pub transparent: bool,
    /// Учитывать scene fog
    pub fog: bool,
}
