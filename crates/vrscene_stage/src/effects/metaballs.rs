//! Metaballs: marching cubes scalar field от physics "point" объектов
//!
//! Rig:
//! - MetaballLayer (child scene root, scale = effect_size) - каждый кадр
//!   переезжает в world position anchor'а
//! - anchor (child камеры, z = -effect_size) - "перед глазами"
//! - MetaballField (child layer) - поле resolution³, куда складываются balls
//!
//! Polygonization поля - задача renderer'а.

use bevy::prelude::*;

use vrscene_sync::{world_position, world_transform, Drawable, PhysicsObjects};

use crate::config::SLIME;

pub const DEFAULT_EFFECT_SIZE: f32 = 10.0;
pub const FIELD_RESOLUTION: usize = 20;
const BALL_SUBTRACT: f32 = 5.0;
const MIN_BALL_STRENGTH: f32 = 0.2;

/// Physics objects этого типа рисуются как metaballs
pub const POINT_KIND: &str = "point";

#[derive(Component, Debug, Clone)]
#[require(Transform, Drawable)]
pub struct MetaballField {
    resolution: usize,
    values: Vec<f32>,
    pub isolation: f32,
    pub material: String,
    balls: usize,
}

impl MetaballField {
    pub fn new(resolution: usize, material: impl Into<String>) -> Self {
        Self {
            resolution,
            values: vec![0.0; resolution * resolution * resolution],
            isolation: 80.0,
            material: material.into(),
            balls: 0,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn reset(&mut self) {
        self.values.fill(0.0);
        self.balls = 0;
    }

    /// Balls добавленные с последнего reset
    pub fn balls(&self) -> usize {
        self.balls
    }

    pub fn value(&self, x: usize, y: usize, z: usize) -> f32 {
        let size = self.resolution;
        self.values[z * size * size + y * size + x]
    }

    pub fn max_value(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }

    /// Ячейки выше isolation (то, что renderer превратит в поверхность)
    pub fn cells_above_isolation(&self) -> usize {
        self.values.iter().filter(|v| **v > self.isolation).count()
    }

    /// Добавляет ball в нормализованных координатах [0, 1]³.
    ///
    /// Вклад `strength / (1e-6 + d²) - subtract`, только положительный, в кубе
    /// радиуса `size·sqrt(strength/subtract)` вокруг центра. Граничные ячейки
    /// (0 и size-1) не трогаются.
    pub fn add_ball(&mut self, ball: Vec3, strength: f32, subtract: f32) {
        let size = self.resolution as f32;
        let sign = strength.signum();
        let strength = strength.abs();
        let radius = size * (strength / subtract).sqrt();

        let range = |center: f32| {
            let scaled = center * size;
            let min = ((scaled - radius).floor() as i64).max(1);
            let max = ((scaled + radius).floor() as i64).min(self.resolution as i64 - 1);
            (min, max)
        };
        let (min_x, max_x) = range(ball.x);
        let (min_y, max_y) = range(ball.y);
        let (min_z, max_z) = range(ball.z);

        let n = self.resolution;
        for z in min_z..max_z {
            let fz = z as f32 / size - ball.z;
            for y in min_y..max_y {
                let fy = y as f32 / size - ball.y;
                for x in min_x..max_x {
                    let fx = x as f32 / size - ball.x;
                    let value = strength / (0.000_001 + fx * fx + fy * fy + fz * fz) - subtract;
                    if value > 0.0 {
                        self.values[z as usize * n * n + y as usize * n + x as usize] += value * sign;
                    }
                }
            }
        }
        self.balls += 1;
    }
}

#[derive(Component, Debug, Clone, Copy)]
#[require(Transform)]
pub struct MetaballLayer {
    pub effect_size: f32,
    pub anchor: Entity,
    pub field: Entity,
}

#[derive(Debug, Clone, Copy)]
pub struct MetaballRig {
    pub layer: Entity,
    pub anchor: Entity,
    pub field: Entity,
}

pub fn spawn_metaballs(world: &mut World, scene_root: Entity, camera: Entity, effect_size: f32) -> MetaballRig {
    let anchor = world
        .spawn((
            Name::new("MetaballAnchor"),
            Transform::from_xyz(0.0, 0.0, -effect_size),
            ChildOf(camera),
        ))
        .id();

    let layer = world
        .spawn((
            Name::new("MetaballLayer"),
            Transform::from_scale(Vec3::splat(effect_size)),
            ChildOf(scene_root),
        ))
        .id();

    let field = world
        .spawn((
            Name::new("Metaballs"),
            MetaballField::new(FIELD_RESOLUTION, SLIME),
            ChildOf(layer),
        ))
        .id();

    world.entity_mut(layer).insert(MetaballLayer {
        effect_size,
        anchor,
        field,
    });

    MetaballRig { layer, anchor, field }
}

/// Tick callback (exclusive: нужен world transform по иерархии)
pub fn update_metaballs(world: &mut World) {
    let mut layers = world.query::<(Entity, &MetaballLayer)>();
    let rigs: Vec<(Entity, MetaballLayer)> = layers.iter(world).map(|(e, l)| (e, *l)).collect();

    for (layer_entity, layer) in rigs {
        // 1. Layer → world position anchor'а
        let Some(anchor_position) = world_position(world, layer.anchor) else {
            continue;
        };
        if let Some(mut transform) = world.get_mut::<Transform>(layer_entity) {
            transform.translation = anchor_position;
        }

        // 2. World → field local → [0, 1]³
        let Some(field_transform) = world_transform(world, layer.field) else {
            continue;
        };
        let to_local = field_transform.affine().inverse();

        let balls: Vec<(Vec3, f32)> = world
            .resource::<PhysicsObjects>()
            .of_kind(POINT_KIND)
            .map(|object| {
                let local = to_local.transform_point3(object.translation());
                let ball = local / 2.0 + Vec3::splat(0.5);
                let strength = (2.0 * object.meta.radius / layer.effect_size).max(MIN_BALL_STRENGTH);
                (ball, strength)
            })
            .collect();

        // 3. Reset + balls
        if let Some(mut field) = world.get_mut::<MetaballField>(layer.field) {
            field.reset();
            for (ball, strength) in balls {
                field.add_ball(ball, strength, BALL_SUBTRACT);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_adds_positive_peak_at_center() {
        let mut field = MetaballField::new(FIELD_RESOLUTION, SLIME);
        field.add_ball(Vec3::splat(0.5), 0.5, BALL_SUBTRACT);

        assert_eq!(field.balls(), 1);
        let center = field.value(10, 10, 10);
        assert!(center > 0.0);
        assert_eq!(center, field.max_value());
        // Граница не трогается
        assert_eq!(field.value(0, 0, 0), 0.0);
    }

    #[test]
    fn test_reset_clears_field() {
        let mut field = MetaballField::new(FIELD_RESOLUTION, SLIME);
        field.add_ball(Vec3::splat(0.5), 1.0, BALL_SUBTRACT);
        field.reset();
        assert_eq!(field.balls(), 0);
        assert_eq!(field.max_value(), 0.0);
    }

    #[test]
    fn test_ball_outside_volume_is_harmless() {
        let mut field = MetaballField::new(FIELD_RESOLUTION, SLIME);
        field.add_ball(Vec3::splat(5.0), 0.2, BALL_SUBTRACT);
        field.add_ball(Vec3::splat(-5.0), 0.2, BALL_SUBTRACT);
        assert_eq!(field.max_value(), 0.0);
    }
}
