//! FrameSyncController: tick driver
//!
//! Каждый кадр (host animation frame → `tick()`), строго по порядку:
//! 1. sync pass: PhysicsObjects → visual Transform (mapped only)
//! 2. tick callbacks в порядке регистрации (первая ошибка прерывает кадр)
//! 3. render через активный RenderMethod
//!
//! Всё на одном потоке, без suspend внутри tick.

use bevy::ecs::system::SystemId;
use bevy::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::dispatch::{CallbackResult, TickCallbacks, TickHandle};
use crate::error::{SceneError, SceneResult};
use crate::logger;
use crate::physics::{parse_physics_batch, PhysicsId, PhysicsObjectSnapshot, PhysicsObjects};
use crate::registry::PhysicsRegistry;
use crate::render::{RenderMethod, RenderTarget, StereoSettings};
use crate::sync::{sync_physics_to_visuals, FrameClock};

/// Создаёт minimal Bevy App для headless scene graph
pub fn create_headless_app() -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .init_resource::<PhysicsObjects>()
        .init_resource::<PhysicsRegistry>()
        .init_resource::<FrameClock>();

    app
}

pub struct FrameSyncController<R: RenderTarget> {
    app: App,
    camera: Entity,
    sync_system: SystemId,
    callbacks: TickCallbacks,
    renderer: R,
    render_method: RenderMethod,
    size: (u32, u32),
}

impl<R: RenderTarget> FrameSyncController<R> {
    /// `camera` - entity с Transform + CameraLens (рендерится каждый tick)
    pub fn new(mut app: App, camera: Entity, renderer: R, size: (u32, u32)) -> Self {
        let world = app.world_mut();
        world.init_resource::<PhysicsObjects>();
        world.init_resource::<PhysicsRegistry>();
        world.init_resource::<FrameClock>();
        let sync_system = world.register_system(sync_physics_to_visuals);

        let mut controller = Self {
            app,
            camera,
            sync_system,
            callbacks: TickCallbacks::default(),
            renderer,
            render_method: RenderMethod::Direct,
            size,
        };
        controller.renderer.set_size(size.0, size.1);
        controller
    }

    /// Заменяет tracked physics objects целиком (копия, без aliasing)
    pub fn set_physics_objects(&mut self, objects: impl IntoIterator<Item = PhysicsObjectSnapshot>) {
        self.world_mut().resource_mut::<PhysicsObjects>().replace(objects);
    }

    /// JSON batch от physics collaborator. Возвращает количество принятых объектов.
    pub fn set_physics_objects_json(&mut self, json: &str) -> SceneResult<usize> {
        let batch = parse_physics_batch(json)?;
        let accepted = batch.len();
        self.set_physics_objects(batch);
        Ok(accepted)
    }

    /// Регистрирует `physics_id → visual` (перезаписывает молча)
    pub fn connect(&mut self, visual: Entity, physics_id: impl Into<PhysicsId>) {
        let physics_id = physics_id.into();
        let previous = self
            .world_mut()
            .resource_mut::<PhysicsRegistry>()
            .connect(physics_id.clone(), visual);

        if let Some(previous) = previous.filter(|previous| *previous != visual) {
            logger::log(&format!(
                "Physics id {} remapped: {:?} → {:?}",
                physics_id, previous, visual
            ));
        }
    }

    pub fn disconnect(&mut self, physics_id: impl Into<PhysicsId>) -> Option<Entity> {
        let physics_id = physics_id.into();
        self.world_mut().resource_mut::<PhysicsRegistry>().disconnect(&physics_id)
    }

    /// Удаляет mappings на despawned entities. Возвращает сколько удалено.
    pub fn prune_despawned(&mut self) -> usize {
        let removed = self
            .app
            .world_mut()
            .resource_scope(|world, mut registry: Mut<PhysicsRegistry>| {
                registry.retain_live(|entity| world.entities().contains(entity))
            });

        if removed > 0 {
            logger::log(&format!("Pruned {} stale physics mappings", removed));
        }
        removed
    }

    /// Добавляет callback в конец dispatch списка
    pub fn on_tick<M>(&mut self, system: impl IntoSystem<(), (), M> + 'static) -> TickHandle {
        self.callbacks.push(self.app.world_mut(), system)
    }

    /// Fallible callback: `Err` прерывает оставшиеся callbacks и render кадра
    pub fn try_on_tick<M>(&mut self, system: impl IntoSystem<(), CallbackResult, M> + 'static) -> TickHandle {
        self.callbacks.push_fallible(self.app.world_mut(), system)
    }

    pub fn off_tick(&mut self, handle: TickHandle) -> SceneResult<()> {
        self.callbacks.remove(self.app.world_mut(), handle)
    }

    pub fn tick(&mut self) -> SceneResult<()> {
        self.tick_at(now_ms())
    }

    /// Tick с явным значением wall clock (replay / тесты)
    pub fn tick_at(&mut self, now_ms: f64) -> SceneResult<()> {
        {
            let mut clock = self.app.world_mut().resource_mut::<FrameClock>();
            clock.now_ms = now_ms;
            clock.frame += 1;
        }

        // 1. Physics → visuals
        self.app
            .world_mut()
            .run_system(self.sync_system)
            .map_err(|e| SceneError::Callback(format!("sync pass: {e:?}")))?;

        // 2. Prerender callbacks
        self.callbacks.run_all(self.app.world_mut())?;

        // 3. Render
        self.render()
    }

    fn render(&mut self) -> SceneResult<()> {
        let world = self.app.world();
        let views = self.render_method.views(world, self.camera, self.size);
        if views.is_empty() {
            logger::log_warning(&format!("Camera {:?} has no Transform/CameraLens, frame skipped", self.camera));
            return Ok(());
        }

        for view in &views {
            self.renderer.render(world, view)?;
        }
        Ok(())
    }

    /// Переключает render method (direct ↔ stereo); camera state не трогается
    pub fn set_render_method(&mut self, method: RenderMethod) {
        self.render_method = method;
        self.renderer.set_size(self.size.0, self.size.1);
    }

    pub fn use_stereo(&mut self, settings: StereoSettings) {
        self.set_render_method(RenderMethod::Stereo(settings));
    }

    pub fn use_direct(&mut self) {
        self.set_render_method(RenderMethod::Direct);
    }

    pub fn render_method(&self) -> RenderMethod {
        self.render_method
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.renderer.set_size(width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn camera(&self) -> Entity {
        self.camera
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}
