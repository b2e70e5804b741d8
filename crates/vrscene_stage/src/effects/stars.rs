//! Star field: точки на сферической оболочке r ∈ [50, 100)

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::PI;
use std::f64::consts::TAU;

use vrscene_sync::FrameClock;

use super::PointCloud;
use crate::config::StageConfig;
use crate::StageRng;

pub const DEFAULT_STAR_COUNT: usize = 100;

const SHELL_INNER: f32 = 50.0;
const SHELL_DEPTH: f32 = 50.0;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct StarField;

/// θ ∈ [0, 2π), φ ∈ [0, π): x = r sinθ cosφ, y = r sinθ sinφ, z = r cosθ
pub fn star_shell_points(rng: &mut impl Rng, count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let theta = rng.gen::<f32>() * PI * 2.0;
            let phi = rng.gen::<f32>() * PI;
            let r = SHELL_INNER + rng.gen::<f32>() * SHELL_DEPTH;

            Vec3::new(
                r * theta.sin() * phi.cos(),
                r * theta.sin() * phi.sin(),
                r * theta.cos(),
            )
        })
        .collect()
}

pub fn spawn_star_field(world: &mut World, parent: Entity, count: usize) -> Entity {
    let points = star_shell_points(&mut world.resource_mut::<StageRng>().rng, count);
    let texture = world.resource::<StageConfig>().image_path("star.png");

    world
        .spawn((
            Name::new("Stars"),
            StarField,
            PointCloud {
                points: points.into(),
                size: 3.0,
                texture,
                opacity: 1.0,
                transparent: true,
                fog: false,
            },
            ChildOf(parent),
        ))
        .id()
}

/// rotation.y = -now/100000, rotation.z = -now/400000 (Euler XYZ)
pub fn star_rotation(now_ms: f64) -> Quat {
    // Epoch ms огромные - сворачиваем угол в f64 до перехода в f32
    let y = ((-now_ms / 100_000.0) % TAU) as f32;
    let z = ((-now_ms / 400_000.0) % TAU) as f32;
    Quat::from_euler(EulerRot::XYZ, 0.0, y, z)
}

pub fn rotate_star_fields(clock: Res<FrameClock>, mut fields: Query<&mut Transform, With<StarField>>) {
    let rotation = star_rotation(clock.now_ms);
    for mut transform in fields.iter_mut() {
        transform.rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_points_within_shell() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let points = star_shell_points(&mut rng, 500);
        assert_eq!(points.len(), 500);

        for point in points {
            let r = point.length();
            assert!((SHELL_INNER - 1e-3..SHELL_INNER + SHELL_DEPTH + 1e-3).contains(&r), "r = {r}");
        }
    }

    #[test]
    fn test_points_deterministic_per_seed() {
        let a = star_shell_points(&mut ChaCha8Rng::seed_from_u64(7), 10);
        let b = star_shell_points(&mut ChaCha8Rng::seed_from_u64(7), 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rotation_from_wall_clock() {
        assert!(star_rotation(0.0).angle_between(Quat::IDENTITY) < 1e-6);

        let (x, y, z) = star_rotation(100_000.0).to_euler(EulerRot::XYZ);
        assert!(x.abs() < 1e-5);
        assert!((y + 1.0).abs() < 1e-5);
        assert!((z + 0.25).abs() < 1e-5);
    }
}
