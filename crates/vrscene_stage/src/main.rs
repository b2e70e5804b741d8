//! Headless demo VRSCENE
//!
//! Stage без рендера: stars, dust, metaballs, fog + игрушечная "физика"
//! (сферы по орбите), 600 кадров с фиксированным шагом 60Hz.
//!
//! Usage: `vrscene-demo [config.json]`

use bevy::prelude::*;
use std::f32::consts::TAU;

use vrscene_stage::{Geometry, MetaballField, SceneMesh, Stage, StageConfig, BORING};
use vrscene_sync::{log, log_error, HeadlessRenderer, PhysicsObjectSnapshot};

const FRAMES: u64 = 600;
const FRAME_MS: f64 = 1000.0 / 60.0;
const SPHERES: usize = 5;
const ORBIT_RADIUS: f32 = 4.0;

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match StageConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("Config {}: {}", path, err));
                std::process::exit(1);
            }
        },
        None => StageConfig::default(),
    };

    let viewport = config.viewport;
    let mut stage = Stage::new(config, HeadlessRenderer::new(viewport.width, viewport.height));

    stage.use_default_stars();
    stage.use_default_dust();
    stage.use_default_metaballs();
    stage.use_fog();

    // Пол для ground query
    let floor = stage
        .world_mut()
        .spawn((
            Name::new("Floor"),
            SceneMesh::new(Geometry::Plane { width: 40.0, depth: 40.0 }, BORING),
        ))
        .id();
    stage.add_to_scene(floor);

    let spheres: Vec<Entity> = (0..SPHERES)
        .map(|index| {
            let sphere = stage.add_sphere(0.5);
            stage.add_to_scene(sphere);
            stage.connect_physics(sphere, index as i64);
            sphere
        })
        .collect();

    match stage.camera_position_above(Vec3::new(0.0, 10.0, 6.0), &[floor]) {
        Ok(destination) => stage.walk_to(destination),
        Err(err) => log_error(&format!("Ground query: {}", err)),
    }

    log(&format!("Starting VRSCENE headless demo ({} frames)", FRAMES));

    for frame in 0..FRAMES {
        let now_ms = frame as f64 * FRAME_MS;
        stage.set_physics_objects(orbit_snapshots(now_ms));

        if let Err(err) = stage.animate_at(now_ms) {
            log_error(&format!("Frame {}: {}", frame, err));
            continue;
        }

        if frame % 100 == 0 {
            let camera = stage
                .world()
                .get::<Transform>(stage.camera())
                .map(|transform| transform.translation)
                .unwrap_or_default();
            let (balls, cells) = metaball_stats(&mut stage);
            log(&format!(
                "Frame {}: {} frames rendered, camera at {:.2}, metaballs {} ({} cells above isolation)",
                frame,
                stage.renderer().frames_rendered(),
                camera,
                balls,
                cells,
            ));
        }
    }

    log(&format!(
        "Demo complete: {} spheres, {} frames rendered",
        spheres.len(),
        stage.renderer().frames_rendered()
    ));
}

fn metaball_stats(stage: &mut Stage<HeadlessRenderer>) -> (usize, usize) {
    let world = stage.world_mut();
    let mut fields = world.query::<&MetaballField>();
    fields
        .iter(world)
        .fold((0, 0), |(balls, cells), field| (balls + field.balls(), cells + field.cells_above_isolation()))
}

/// Сферы равномерно по кругу, фаза вращается со временем
fn orbit_snapshots(now_ms: f64) -> Vec<PhysicsObjectSnapshot> {
    let phase = ((now_ms / 2000.0) % std::f64::consts::TAU) as f32;
    (0..SPHERES)
        .map(|index| {
            let angle = phase + index as f32 * TAU / SPHERES as f32;
            let position = Vec3::new(angle.cos() * ORBIT_RADIUS, 1.0, angle.sin() * ORBIT_RADIUS - 10.0);
            PhysicsObjectSnapshot::new(index as i64, position).with_meta("point", 0.5)
        })
        .collect()
}
