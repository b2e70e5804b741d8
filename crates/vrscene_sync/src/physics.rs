//! Physics snapshots: state от внешней симуляции (worker / engine)
//!
//! Wire format (JSON от physics collaborator):
//! `{ id, position: {x,y,z}, quaternion?: {x,y,z,w}, meta: {type, radius} }`
//!
//! Snapshot живёт один tick: коллаборатор присылает свежий список,
//! `PhysicsObjects` заменяется целиком (copy on input, без aliasing).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SceneError, SceneResult};
use crate::logger;

/// Identity физического объекта (в JSON бывает и число, и строка)
///
/// Id ведёт себя как ключ объекта: `7`, `7.0` и `"7"` - один id.
/// Строка становится `Int` только в канонической записи (`"07"` остаётся текстом),
/// дробное число - текстом (`1.5` == `"1.5"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PhysicsId {
    Int(i64),
    Text(String),
}

impl PhysicsId {
    fn from_number(id: f64) -> Self {
        if id.fract() == 0.0 && id.abs() < i64::MAX as f64 {
            PhysicsId::Int(id as i64)
        } else {
            PhysicsId::Text(id.to_string())
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPhysicsId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for PhysicsId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawPhysicsId::deserialize(deserializer)? {
            RawPhysicsId::Int(id) => PhysicsId::Int(id),
            RawPhysicsId::Float(id) => PhysicsId::from_number(id),
            RawPhysicsId::Text(id) => PhysicsId::from(id),
        })
    }
}

impl fmt::Display for PhysicsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsId::Int(id) => write!(f, "{}", id),
            PhysicsId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for PhysicsId {
    fn from(id: i64) -> Self {
        PhysicsId::Int(id)
    }
}

impl From<&str> for PhysicsId {
    fn from(id: &str) -> Self {
        match id.parse::<i64>() {
            Ok(number) if number.to_string() == id => PhysicsId::Int(number),
            _ => PhysicsId::Text(id.to_string()),
        }
    }
}

impl From<String> for PhysicsId {
    fn from(id: String) -> Self {
        match id.parse::<i64>() {
            Ok(number) if number.to_string() == id => PhysicsId::Int(number),
            _ => PhysicsId::Text(id),
        }
    }
}

/// `{x, y, z}` как в wire format
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

/// `{x, y, z, w}` quaternion как в wire format
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl From<Orientation> for Quat {
    fn from(q: Orientation) -> Self {
        Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

impl From<Quat> for Orientation {
    fn from(q: Quat) -> Self {
        Self { x: q.x, y: q.y, z: q.z, w: q.w }
    }
}

/// Free-form metadata (используется effect callbacks, например metaballs)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMeta {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsObjectSnapshot {
    pub id: PhysicsId,
    pub position: Position,
    #[serde(default)]
    pub quaternion: Option<Orientation>,
    #[serde(default)]
    pub meta: PhysicsMeta,
}

impl PhysicsObjectSnapshot {
    pub fn new(id: impl Into<PhysicsId>, position: Vec3) -> Self {
        Self {
            id: id.into(),
            position: position.into(),
            quaternion: None,
            meta: PhysicsMeta::default(),
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.quaternion = Some(rotation.into());
        self
    }

    pub fn with_meta(mut self, kind: impl Into<String>, radius: f32) -> Self {
        self.meta = PhysicsMeta {
            kind: Some(kind.into()),
            radius,
        };
        self
    }

    pub fn translation(&self) -> Vec3 {
        self.position.into()
    }

    pub fn rotation(&self) -> Option<Quat> {
        self.quaternion.map(Quat::from)
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.meta.kind.as_deref() == Some(kind)
    }
}

/// Tracked physics objects (заменяется целиком на каждый update от симуляции)
#[derive(Resource, Debug, Clone, Default)]
pub struct PhysicsObjects {
    objects: Vec<PhysicsObjectSnapshot>,
}

impl PhysicsObjects {
    /// Заменяет список целиком (не incremental)
    pub fn replace(&mut self, objects: impl IntoIterator<Item = PhysicsObjectSnapshot>) {
        self.objects.clear();
        self.objects.extend(objects);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhysicsObjectSnapshot> {
        self.objects.iter()
    }

    /// Объекты с `meta.type == kind`
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a PhysicsObjectSnapshot> + 'a {
        self.objects.iter().filter(move |object| object.is_kind(kind))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Парсит JSON batch от physics collaborator
///
/// Документ должен быть массивом. Malformed элементы (нет `id` или `position`)
/// пропускаются с warning - как unmapped id в sync pass.
pub fn parse_physics_batch(json: &str) -> SceneResult<Vec<PhysicsObjectSnapshot>> {
    let document: serde_json::Value = serde_json::from_str(json)?;

    let serde_json::Value::Array(items) = document else {
        return Err(SceneError::InvalidPhysicsBatch(
            "expected a JSON array of physics objects".to_string(),
        ));
    };

    let mut snapshots = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<PhysicsObjectSnapshot>(item) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(err) => {
                logger::log_warning(&format!(
                    "Skipping malformed physics object #{}: {}",
                    index, err
                ));
            }
        }
    }

    Ok(snapshots)
}
