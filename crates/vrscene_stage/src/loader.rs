//! Scene/model loading: `models/<id>.json` → NodeDescription
//!
//! Чтение + парсинг идут на IoTaskPool, результат - `Task`. Spawn в World
//! делает caller на tick потоке (`spawn_description`), никогда не внутри tick.
//! Retry нет.

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task, TaskPool};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use vrscene_sync::{log, SceneError, SceneResult};

use crate::config::BORING;
use crate::geometry::{Geometry, SceneMesh};

/// Узел сцены из JSON (иерархия)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeDescription {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// Quaternion xyzw
    #[serde(default)]
    pub rotation: Option<[f32; 4]>,
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub mesh: Option<MeshDescription>,
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeshDescription {
    pub geometry: Geometry,
    #[serde(default = "default_material")]
    pub material: String,
}

fn default_material() -> String {
    BORING.to_string()
}

impl NodeDescription {
    pub fn transform(&self) -> Transform {
        let rotation = self
            .rotation
            .map(Quat::from_array)
            .filter(|q| q.length_squared() > f32::EPSILON)
            .map(Quat::normalize)
            .unwrap_or(Quat::IDENTITY);

        Transform {
            translation: Vec3::from_array(self.position),
            rotation,
            scale: Vec3::from_array(self.scale),
        }
    }

    /// Узлов в поддереве (включая self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeDescription::node_count).sum::<usize>()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> SceneResult<T> {
    let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}

fn spawn_load<T>(path: PathBuf) -> Task<SceneResult<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    IoTaskPool::get_or_init(TaskPool::new).spawn(async move {
        let result = read_json(&path);
        match &result {
            Ok(_) => log(&format!("Loaded {}", path.display())),
            Err(err) => log(&format!("Load failed {}: {}", path.display(), err)),
        }
        result
    })
}

pub fn load_scene_description(path: impl Into<PathBuf>) -> Task<SceneResult<NodeDescription>> {
    spawn_load(path.into())
}

pub fn load_geometry(path: impl Into<PathBuf>) -> Task<SceneResult<Geometry>> {
    spawn_load(path.into())
}

/// Spawn поддерева; `parent = None` - detached корень
pub fn spawn_description(world: &mut World, description: &NodeDescription, parent: Option<Entity>) -> Entity {
    let mut node = world.spawn((Name::new(description.name.clone()), description.transform()));
    if let Some(parent) = parent {
        node.insert(ChildOf(parent));
    }
    if let Some(mesh) = &description.mesh {
        node.insert(SceneMesh::new(mesh.geometry.clone(), mesh.material.clone()));
    }
    let entity = node.id();

    for child in &description.children {
        spawn_description(world, child, Some(entity));
    }
    entity
}
