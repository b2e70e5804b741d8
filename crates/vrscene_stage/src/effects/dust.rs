//! Dust: две point cloud'ы с общим буфером точек, бесконечный scroll по Y

use bevy::prelude::*;
use rand::Rng;

use vrscene_sync::FrameClock;

use super::PointCloud;
use crate::config::StageConfig;
use crate::StageRng;

pub const DEFAULT_DUST_COUNT: usize = 2000;
pub const DUST_WIDTH: f32 = 100.0;
pub const DUST_HEIGHT: f32 = 20.0;

/// Слой dust; `offset` - сдвиг второго слоя на высоту коробки
#[derive(Component, Debug, Clone, Copy)]
pub struct DustLayer {
    pub offset: f32,
}

/// Равномерно в коробке width × height × width с центром в origin
pub fn dust_box_points(rng: &mut impl Rng, count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.gen::<f32>() * DUST_WIDTH - DUST_WIDTH / 2.0,
                rng.gen::<f32>() * DUST_HEIGHT - DUST_HEIGHT / 2.0,
                rng.gen::<f32>() * DUST_WIDTH - DUST_WIDTH / 2.0,
            )
        })
        .collect()
}

pub fn spawn_dust(world: &mut World, parent: Entity, count: usize) -> [Entity; 2] {
    let points: std::sync::Arc<[Vec3]> = dust_box_points(&mut world.resource_mut::<StageRng>().rng, count).into();
    let texture = world.resource::<StageConfig>().image_path("dust.png");

    let cloud = PointCloud {
        points,
        size: 0.3,
        texture,
        opacity: 0.3,
        transparent: true,
        fog: true,
    };

    [0.0, DUST_HEIGHT].map(|offset| {
        world
            .spawn((
                Name::new("Dust"),
                DustLayer { offset },
                cloud.clone(),
                ChildOf(parent),
            ))
            .id()
    })
}

/// `((-now / 40000) % height) * 2` - остаток со знаком делимого, как у `%` на f64
pub fn dust_scroll(now_ms: f64) -> f32 {
    ((-now_ms / 40_000.0) % DUST_HEIGHT as f64 * 2.0) as f32
}

pub fn scroll_dust(clock: Res<FrameClock>, mut layers: Query<(&DustLayer, &mut Transform)>) {
    let scroll = dust_scroll(clock.now_ms);
    for (layer, mut transform) in layers.iter_mut() {
        transform.translation.y = scroll + layer.offset;
    }
}
