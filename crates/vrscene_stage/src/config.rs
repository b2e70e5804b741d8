//! Stage configuration: создаётся один раз при старте, read-only дальше
//!
//! Всё, что раньше было process-wide (shared materials, reflection cube,
//! пути к assets), приходит сюда и инжектится в Stage как resources.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use vrscene_sync::{HexColor, SceneError, SceneResult, StereoSettings};

pub const SLIME: &str = "slime";
pub const BORING: &str = "boring";
pub const WIREFRAME: &str = "wireframe";

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Корень assets (images/ и models/ резолвятся относительно него)
    pub asset_root: PathBuf,
    pub images_dir: String,
    pub models_dir: String,
    pub cube_map: CubeMapConfig,
    pub viewport: ViewportConfig,
    pub camera: CameraConfig,
    pub hud: HudConfig,
    pub stereo: StereoSettings,
    pub fog: FogConfig,
    pub materials: HashMap<String, MaterialSpec>,
    /// Seed для procedural генерации (stars, dust)
    pub seed: u64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            images_dir: "images".to_string(),
            models_dir: "models".to_string(),
            cube_map: CubeMapConfig::default(),
            viewport: ViewportConfig::default(),
            camera: CameraConfig::default(),
            hud: HudConfig::default(),
            stereo: StereoSettings::default(),
            fog: FogConfig::default(),
            materials: default_materials(),
            seed: 42,
        }
    }
}

impl StageConfig {
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        let mut config: StageConfig = serde_json::from_str(json)?;
        // Частичный materials в конфиге дополняется стандартными
        for (name, spec) in default_materials() {
            config.materials.entry(name).or_insert(spec);
        }
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn image_path(&self, file: &str) -> PathBuf {
        self.asset_root.join(&self.images_dir).join(file)
    }

    /// `models/<id>.json`
    pub fn model_path(&self, id: &str) -> PathBuf {
        self.asset_root.join(&self.models_dir).join(format!("{}.json", id))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CubeMapConfig {
    pub faces: [String; 6],
    pub format: String,
}

impl Default for CubeMapConfig {
    fn default() -> Self {
        Self {
            faces: ["px", "nx", "py", "ny", "pz", "nz"].map(String::from),
            format: ".jpg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            pixel_ratio: 1.0,
        }
    }
}

impl ViewportConfig {
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Высота "глаз" над землёй (ground query добавляет её к точке попадания)
    pub height: f32,
    /// Камера смотрит на (0, height, look_target_z), затем разворот на π по Y
    pub look_target_z: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            height: 2.0,
            look_target_z: -9.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    pub offset: [f32; 3],
    pub scale: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            offset: [0.0, 0.0, -0.2],
            scale: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub color: HexColor,
    pub near: f32,
    pub far: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: HexColor(0x7B6B03),
            near: 1.0,
            far: 40.0,
        }
    }
}

/// Описание материала (shading делает renderer, здесь только параметры)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MaterialSpec {
    pub color: HexColor,
    pub specular: Option<HexColor>,
    /// Использует reflection cube map
    pub env_map: bool,
    pub reflectivity: f32,
    pub wireframe: bool,
    pub transparent: bool,
    pub opacity: f32,
}

impl Default for MaterialSpec {
    fn default() -> Self {
        Self {
            color: HexColor(0xFFFFFF),
            specular: None,
            env_map: false,
            reflectivity: 0.0,
            wireframe: false,
            transparent: false,
            opacity: 1.0,
        }
    }
}

fn default_materials() -> HashMap<String, MaterialSpec> {
    HashMap::from([
        (
            SLIME.to_string(),
            MaterialSpec {
                color: HexColor(0x99FF99),
                specular: Some(HexColor(0x440000)),
                env_map: true,
                reflectivity: 0.3,
                ..default()
            },
        ),
        (
            BORING.to_string(),
            MaterialSpec {
                specular: Some(HexColor(0x440000)),
                ..default()
            },
        ),
        (
            WIREFRAME.to_string(),
            MaterialSpec {
                wireframe: true,
                ..default()
            },
        ),
    ])
}

/// Shared materials (read-only resource)
#[derive(Resource, Debug, Clone)]
pub struct MaterialLibrary {
    materials: HashMap<String, MaterialSpec>,
}

impl MaterialLibrary {
    pub fn from_config(config: &StageConfig) -> Self {
        Self {
            materials: config.materials.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MaterialSpec> {
        self.materials.get(name)
    }
}

/// Reflection cube map: шесть граней `px,nx,py,ny,pz,nz` + format
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CubeMap {
    pub faces: [PathBuf; 6],
}

impl CubeMap {
    pub fn from_config(config: &StageConfig) -> Self {
        let cube = &config.cube_map;
        Self {
            faces: cube
                .faces
                .clone()
                .map(|face| config.image_path(&format!("{}{}", face, cube.format))),
        }
    }
}
