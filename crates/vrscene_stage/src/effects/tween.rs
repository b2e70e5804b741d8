//! Translation tweens (camera walk)
//!
//! Tween стартует на первом tick после добавления (start_ms берётся из
//! FrameClock), поэтому добавление вне tick не зависит от wall clock.

use bevy::prelude::*;

use vrscene_sync::FrameClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    QuadraticOut,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticOut => t * (2.0 - t),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub target: Entity,
    pub from: Vec3,
    pub to: Vec3,
    pub duration_ms: f64,
    pub easing: Easing,
    start_ms: Option<f64>,
}

impl Tween {
    pub fn new(target: Entity, from: Vec3, to: Vec3, duration_ms: f64, easing: Easing) -> Self {
        Self {
            target,
            from,
            to,
            duration_ms,
            easing,
            start_ms: None,
        }
    }

    /// Позиция в момент now; второй элемент - tween завершён
    fn sample(&mut self, now_ms: f64) -> (Vec3, bool) {
        let start = *self.start_ms.get_or_insert(now_ms);
        if self.duration_ms <= 0.0 {
            return (self.to, true);
        }

        let t = ((now_ms - start) / self.duration_ms).clamp(0.0, 1.0);
        let eased = self.easing.apply(t as f32);
        (self.from.lerp(self.to, eased), t >= 1.0)
    }
}

#[derive(Resource, Debug, Default)]
pub struct Tweens {
    active: Vec<Tween>,
}

impl Tweens {
    /// Новый tween для target заменяет предыдущий
    pub fn start(&mut self, tween: Tween) {
        self.active.retain(|active| active.target != tween.target);
        self.active.push(tween);
    }

    pub fn is_active(&self, target: Entity) -> bool {
        self.active.iter().any(|tween| tween.target == target)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

pub fn update_tweens(clock: Res<FrameClock>, mut tweens: ResMut<Tweens>, mut transforms: Query<&mut Transform>) {
    let now_ms = clock.now_ms;
    tweens.active.retain_mut(|tween| {
        let Ok(mut transform) = transforms.get_mut(tween.target) else {
            // Target despawned
            return false;
        };
        let (position, finished) = tween.sample(now_ms);
        transform.translation = position;
        !finished
    });
}
