//! VRSCENE Stage
//!
//! Composition layer поверх vrscene_sync: camera rig + HUD, per-frame effects
//! (stars, dust, metaballs, fog, walk tweens, device orientation, orbit),
//! загрузка сцен, поиск узлов, ground query.
//!
//! Всё собирается в `Stage`, который владеет FrameSyncController.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod camera;
pub mod config;
pub mod effects;
pub mod geometry;
pub mod ground;
pub mod loader;
pub mod pick;
pub mod stage;

pub use camera::{initial_camera_rotation, spawn_camera_rig, CameraRig, Hud, StageCamera};
pub use config::{CubeMap, MaterialLibrary, MaterialSpec, StageConfig, BORING, SLIME, WIREFRAME};
pub use effects::{
    DeviceOrientationReading, InputElement, MetaballField, OrbitControls, PointCloud, SceneFog, StarField,
};
pub use geometry::{Geometry, SceneMesh};
pub use ground::camera_position_above;
pub use loader::{load_geometry, load_scene_description, spawn_description, MeshDescription, NodeDescription};
pub use pick::{pick_objects, PickedObjects};
pub use stage::Stage;

/// Детерминистичный RNG для procedural генерации (stars, dust)
#[derive(Resource)]
pub struct StageRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl StageRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}
