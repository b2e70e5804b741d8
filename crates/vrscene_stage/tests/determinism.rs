//! Детерминизм procedural effects
//!
//! Stage с одинаковым seed даёт идентичные stars/dust и одинаковые кадры

use bevy::prelude::*;
use vrscene_stage::effects::DustLayer;
use vrscene_stage::*;
use vrscene_sync::{HeadlessRenderer, PhysicsObjectSnapshot, RenderedFrame};

/// Snapshot для сравнения: точки всех clouds + история кадров
#[derive(Debug, PartialEq)]
struct StageSnapshot {
    stars: Vec<Vec3>,
    dust: Vec<Vec3>,
    frames: Vec<RenderedFrame>,
}

fn run_stage(seed: u64, ticks: usize) -> StageSnapshot {
    let config = StageConfig { seed, ..default() };
    let mut stage = Stage::new(config, HeadlessRenderer::default());
    stage.use_stars(64);
    stage.use_dust(256);
    stage.use_default_metaballs();

    let sphere = stage.add_sphere(0.5);
    stage.add_to_scene(sphere);
    stage.connect_physics(sphere, 0i64);

    for tick in 0..ticks {
        let now_ms = tick as f64 * 16.0;
        let x = (tick as f32 * 0.1).sin() * 3.0;
        stage.set_physics_objects(vec![
            PhysicsObjectSnapshot::new(0i64, Vec3::new(x, 1.0, -5.0)).with_meta("point", 0.5)
        ]);
        stage.animate_at(now_ms).unwrap();
    }

    let world = stage.world_mut();
    let mut stars = world.query_filtered::<&PointCloud, With<StarField>>();
    let stars = stars.single(world).unwrap().points.to_vec();
    let mut dust = world.query_filtered::<&PointCloud, With<DustLayer>>();
    let dust = dust.iter(world).next().unwrap().points.to_vec();

    StageSnapshot {
        stars,
        dust,
        frames: stage.renderer().history().cloned().collect(),
    }
}

#[test]
fn test_same_seed_same_stage() {
    const SEED: u64 = 12345;

    let snapshot1 = run_stage(SEED, 120);
    let snapshot2 = run_stage(SEED, 120);

    assert_eq!(
        snapshot1, snapshot2,
        "Stage с одинаковым seed ({}) дал разные результаты!",
        SEED
    );
}

#[test]
fn test_different_seed_different_points() {
    let snapshot1 = run_stage(1, 1);
    let snapshot2 = run_stage(2, 1);

    assert_ne!(snapshot1.stars, snapshot2.stars);
    assert_ne!(snapshot1.dust, snapshot2.dust);
}
