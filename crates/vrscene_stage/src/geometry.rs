//! Geometry + SceneMesh: renderable описание (без GPU буферов)
//!
//! Renderer сам строит буферы из Geometry. Здесь же - Rapier collider
//! для ray cast запросов (ground query).

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;
use serde::Deserialize;

use vrscene_sync::{Drawable, SceneError, SceneResult};

/// Half-height cuboid collider для Plane
const PLANE_HALF_THICKNESS: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Sphere {
        radius: f32,
        #[serde(default = "default_width_segments")]
        width_segments: u32,
        #[serde(default = "default_height_segments")]
        height_segments: u32,
    },
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    /// Горизонтальная плоскость (XZ), нормаль +Y
    Plane {
        width: f32,
        depth: f32,
    },
    Mesh {
        vertices: Vec<[f32; 3]>,
        faces: Vec<[u32; 3]>,
    },
}

fn default_width_segments() -> u32 {
    8
}

fn default_height_segments() -> u32 {
    5
}

impl Geometry {
    /// Low-poly UV sphere (8×5 сегментов)
    pub fn sphere(radius: f32) -> Self {
        Geometry::Sphere {
            radius,
            width_segments: default_width_segments(),
            height_segments: default_height_segments(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Sphere { width_segments, height_segments, .. } => {
                ((width_segments + 1) * (height_segments + 1)) as usize
            }
            Geometry::Box { .. } => 24,
            Geometry::Plane { .. } => 4,
            Geometry::Mesh { vertices, .. } => vertices.len(),
        }
    }

    /// Rapier collider в world масштабе (scale запекается в размеры)
    pub fn collider(&self, scale: Vec3) -> SceneResult<Collider> {
        match self {
            Geometry::Sphere { radius, .. } => Ok(Collider::ball(radius * scale.max_element())),
            Geometry::Box { width, height, depth } => Ok(Collider::cuboid(
                width * scale.x / 2.0,
                height * scale.y / 2.0,
                depth * scale.z / 2.0,
            )),
            Geometry::Plane { width, depth } => Ok(Collider::cuboid(
                width * scale.x / 2.0,
                PLANE_HALF_THICKNESS,
                depth * scale.z / 2.0,
            )),
            Geometry::Mesh { vertices, faces } => {
                if faces.is_empty() {
                    return Err(SceneError::Geometry("mesh has no faces".to_string()));
                }
                let vertex_count = vertices.len() as u32;
                if let Some(face) = faces.iter().find(|face| face.iter().any(|&i| i >= vertex_count)) {
                    return Err(SceneError::Geometry(format!(
                        "face {:?} references a vertex out of range ({} vertices)",
                        face, vertex_count
                    )));
                }

                let scaled: Vec<Vec3> = vertices.iter().map(|v| Vec3::from_array(*v) * scale).collect();
                Collider::trimesh(scaled, faces.clone())
                    .map_err(|err| SceneError::Geometry(format!("{err:?}")))
            }
        }
    }
}

/// Renderable mesh node (material - имя из MaterialLibrary)
#[derive(Component, Debug, Clone)]
#[require(Transform, Drawable)]
pub struct SceneMesh {
    pub geometry: Geometry,
    pub material: String,
}

impl SceneMesh {
    pub fn new(geometry: Geometry, material: impl Into<String>) -> Self {
        Self {
            geometry,
            material: material.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_defaults_from_json() {
        let geometry: Geometry = serde_json::from_str(r#"{"type": "sphere", "radius": 2}"#).unwrap();
        assert_eq!(geometry, Geometry::sphere(2.0));
        assert_eq!(geometry.vertex_count(), 54);
    }

    #[test]
    fn test_mesh_collider_validates_indices() {
        let broken = Geometry::Mesh {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            faces: vec![[0, 1, 2]],
        };
        assert!(matches!(broken.collider(Vec3::ONE), Err(SceneError::Geometry(_))));

        let empty = Geometry::Mesh { vertices: vec![], faces: vec![] };
        assert!(empty.collider(Vec3::ONE).is_err());
    }
}
