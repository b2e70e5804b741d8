//! Render step: внешний collaborator за trait `RenderTarget`
//!
//! Два render method:
//! - Direct: один view на весь viewport
//! - Stereo (cardboard): два view (left/right half), глаза разнесены по right оси камеры
//!
//! Переключение method не трогает camera state.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::VecDeque;

use crate::error::SceneResult;
use crate::scene::{world_transform, Drawable};

/// RGB цвет в hex (`0x7B6B03`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct HexColor(pub u32);

impl HexColor {
    pub const BLACK: HexColor = HexColor(0x000000);

    pub fn rgb(&self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Perspective lens камеры (fov в градусах, как в конфиге)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CameraLens {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraLens {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraLens {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Mono,
    Left,
    Right,
}

/// Всё что renderer'у нужно для одного draw call
#[derive(Debug, Clone)]
pub struct CameraView {
    pub camera: Entity,
    pub eye: Eye,
    pub transform: GlobalTransform,
    pub lens: CameraLens,
    pub viewport: Viewport,
    /// Stereo: дистанция сведения глаз (None для mono)
    pub convergence: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StereoSettings {
    pub eye_separation: f32,
    pub target_distance: f32,
}

impl Default for StereoSettings {
    fn default() -> Self {
        Self {
            eye_separation: 0.008,
            target_distance: 0.25,
        }
    }
}

/// Renderer (WebGL/wgpu/headless - вне этого crate)
pub trait RenderTarget {
    fn render(&mut self, world: &World, view: &CameraView) -> SceneResult<()>;
    fn set_size(&mut self, width: u32, height: u32);
    fn set_clear_color(&mut self, color: HexColor);
}

/// Активный render method (runtime-switchable)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RenderMethod {
    #[default]
    Direct,
    Stereo(StereoSettings),
}

impl RenderMethod {
    /// Views для текущего кадра. Пусто, если у камеры нет Transform/CameraLens.
    pub fn views(&self, world: &World, camera: Entity, size: (u32, u32)) -> Vec<CameraView> {
        let (Some(transform), Some(lens)) = (world_transform(world, camera), world.get::<CameraLens>(camera)) else {
            return Vec::new();
        };
        let (width, height) = size;

        match *self {
            RenderMethod::Direct => vec![CameraView {
                camera,
                eye: Eye::Mono,
                transform,
                lens: *lens,
                viewport: Viewport::full(width, height),
                convergence: None,
            }],
            RenderMethod::Stereo(settings) => {
                let half = width / 2;
                let right_axis = transform.right();
                let offset = *right_axis * (settings.eye_separation / 2.0);

                [(Eye::Left, -offset, 0), (Eye::Right, offset, half)]
                    .into_iter()
                    .map(|(eye, shift, x)| {
                        let viewport = Viewport { x, y: 0, width: half, height };
                        let mut eye_transform = transform.compute_transform();
                        eye_transform.translation += shift;
                        CameraView {
                            camera,
                            eye,
                            transform: GlobalTransform::from(eye_transform),
                            lens: CameraLens { aspect: viewport.aspect(), ..*lens },
                            viewport,
                            convergence: Some(settings.target_distance),
                        }
                    })
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub eye: Eye,
    pub viewport: Viewport,
    pub eye_position: Vec3,
    pub drawables: usize,
    pub clear_color: HexColor,
}

/// Headless renderer: ничего не рисует, записывает кадры (demo + тесты)
#[derive(Debug)]
pub struct HeadlessRenderer {
    size: (u32, u32),
    clear_color: HexColor,
    history: VecDeque<RenderedFrame>,
    history_limit: usize,
    frames_rendered: u64,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl HeadlessRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            clear_color: HexColor::BLACK,
            history: VecDeque::new(),
            history_limit: 64,
            frames_rendered: 0,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn clear_color(&self) -> HexColor {
        self.clear_color
    }

    /// Количество draw calls (stereo = 2 на tick)
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn history(&self) -> impl Iterator<Item = &RenderedFrame> {
        self.history.iter()
    }

    pub fn last_frame(&self) -> Option<&RenderedFrame> {
        self.history.back()
    }
}

impl RenderTarget for HeadlessRenderer {
    fn render(&mut self, world: &World, view: &CameraView) -> SceneResult<()> {
        let drawables = world
            .iter_entities()
            .filter(|entity| entity.contains::<Drawable>())
            .count();

        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(RenderedFrame {
            eye: view.eye,
            viewport: view.viewport,
            eye_position: view.transform.translation(),
            drawables,
            clear_color: self.clear_color,
        });
        self.frames_rendered += 1;
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn set_clear_color(&mut self, color: HexColor) {
        self.clear_color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_camera(world: &mut World) -> Entity {
        world
            .spawn((Transform::from_xyz(0.0, 2.0, 0.0), CameraLens::default()))
            .id()
    }

    #[test]
    fn test_direct_single_full_view() {
        let mut world = World::new();
        let camera = spawn_camera(&mut world);

        let views = RenderMethod::Direct.views(&world, camera, (800, 600));
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].eye, Eye::Mono);
        assert_eq!(views[0].viewport, Viewport::full(800, 600));
        assert_eq!(views[0].transform.translation(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_stereo_splits_viewport_and_separates_eyes() {
        let mut world = World::new();
        let camera = spawn_camera(&mut world);

        let views = RenderMethod::Stereo(StereoSettings::default()).views(&world, camera, (800, 600));
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].eye, Eye::Left);
        assert_eq!(views[0].viewport, Viewport { x: 0, y: 0, width: 400, height: 600 });
        assert_eq!(views[1].viewport.x, 400);

        let separation = views[1].transform.translation() - views[0].transform.translation();
        assert!((separation - Vec3::new(0.008, 0.0, 0.0)).length() < 1e-6);
        assert_eq!(views[0].convergence, Some(0.25));
        assert!((views[0].lens.aspect - 400.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_views_empty_without_lens() {
        let mut world = World::new();
        let not_a_camera = world.spawn(Transform::default()).id();
        assert!(RenderMethod::Direct.views(&world, not_a_camera, (10, 10)).is_empty());
    }

    #[test]
    fn test_headless_counts_drawables() {
        let mut world = World::new();
        let camera = spawn_camera(&mut world);
        world.spawn((Transform::default(), Drawable));
        world.spawn((Transform::default(), Drawable));
        world.spawn(Transform::default());

        let mut renderer = HeadlessRenderer::new(640, 480);
        renderer.set_clear_color(HexColor(0x7B6B03));
        for view in RenderMethod::Direct.views(&world, camera, renderer.size()) {
            renderer.render(&world, &view).unwrap();
        }

        let frame = renderer.last_frame().unwrap();
        assert_eq!(frame.drawables, 2);
        assert_eq!(frame.clear_color, HexColor(0x7B6B03));
        assert_eq!(renderer.frames_rendered(), 1);
        assert_eq!(HexColor(0x7B6B03).rgb(), (0x7B, 0x6B, 0x03));
    }
}
