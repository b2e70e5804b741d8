//! Registry: маппинг PhysicsId → visual Entity
//!
//! Non-owning: entity принадлежит scene graph (World). Если entity
//! деспавнилась, entry остаётся, но sync pass её молча пропускает.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::physics::PhysicsId;

#[derive(Resource, Debug, Default)]
pub struct PhysicsRegistry {
    visuals: HashMap<PhysicsId, Entity>,
}

impl PhysicsRegistry {
    /// Регистрирует mapping; повторный connect с тем же id перезаписывает.
    /// Возвращает предыдущий visual (если был).
    pub fn connect(&mut self, physics_id: PhysicsId, visual: Entity) -> Option<Entity> {
        self.visuals.insert(physics_id, visual)
    }

    pub fn disconnect(&mut self, physics_id: &PhysicsId) -> Option<Entity> {
        self.visuals.remove(physics_id)
    }

    pub fn get(&self, physics_id: &PhysicsId) -> Option<Entity> {
        self.visuals.get(physics_id).copied()
    }

    /// Удаляет entries, чьи entities больше не существуют
    pub fn retain_live(&mut self, world_entities: impl Fn(Entity) -> bool) -> usize {
        let before = self.visuals.len();
        self.visuals.retain(|_, entity| world_entities(*entity));
        before - self.visuals.len()
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }
}
