//! Stage: scene + camera rig + FrameSyncController
//!
//! Ресурсы, создаваемые один раз при старте: StageConfig, MaterialLibrary,
//! CubeMap, StageRng, Tweens. Дальше read-only (кроме Tweens/RNG).
//!
//! Порядок tick callbacks: walk tweens (регистрируется в конструкторе),
//! затем всё, что добавил пользователь/effects, в порядке добавления.

use bevy::prelude::*;
use bevy::tasks::Task;

use vrscene_sync::{
    create_headless_app, log, CallbackResult, CameraLens, FrameSyncController, PhysicsId,
    PhysicsObjectSnapshot, RenderTarget, SceneResult, SceneRoot, TickHandle,
};

use crate::camera::{spawn_camera_rig, CameraRig, StageCamera};
use crate::config::{CubeMap, MaterialLibrary, StageConfig, WIREFRAME};
use crate::effects::{
    dust, metaballs, orbit_camera_controls, rotate_star_fields, scroll_dust, spawn_dust, spawn_metaballs,
    spawn_star_field, stars, update_device_orientation, update_metaballs, update_tweens,
    DeviceOrientationController, DeviceOrientationReading, Easing, InputElement, OrbitControls, OrbitInput,
    SceneFog, Tween, Tweens,
};
use crate::geometry::{Geometry, SceneMesh};
use crate::ground;
use crate::loader::{self, NodeDescription};
use crate::pick::{self, PickedObjects};
use crate::StageRng;

/// Длительность walk_to на единицу расстояния
const WALK_MS_PER_UNIT: f64 = 500.0;
const DEFAULT_SPHERE_RADIUS: f32 = 1.0;

pub struct Stage<R: RenderTarget> {
    controller: FrameSyncController<R>,
    scene_root: Entity,
    rig: CameraRig,
    orientation_callback: Option<TickHandle>,
    orbit_callback: Option<TickHandle>,
}

impl<R: RenderTarget> Stage<R> {
    pub fn new(config: StageConfig, renderer: R) -> Self {
        let mut app = create_headless_app();
        let world = app.world_mut();

        world.insert_resource(MaterialLibrary::from_config(&config));
        world.insert_resource(CubeMap::from_config(&config));
        world.insert_resource(StageRng::new(config.seed));
        world.init_resource::<Tweens>();

        let scene_root = world
            .spawn((Name::new("Scene"), SceneRoot, Transform::default()))
            .id();
        let rig = spawn_camera_rig(world, &config, scene_root);

        let viewport = config.viewport;
        let size = (
            (viewport.width as f32 * viewport.pixel_ratio).round() as u32,
            (viewport.height as f32 * viewport.pixel_ratio).round() as u32,
        );
        log(&format!(
            "Stage created: {}x{} (pixel ratio {}), assets at {}",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio,
            config.asset_root.display()
        ));
        world.insert_resource(config);

        let mut controller = FrameSyncController::new(app, rig.camera, renderer, size);
        controller.on_tick(update_tweens);

        Self {
            controller,
            scene_root,
            rig,
            orientation_callback: None,
            orbit_callback: None,
        }
    }

    /// Stage с уже загруженной сценой (поддерево под scene root)
    pub fn with_scene(config: StageConfig, renderer: R, scene: &NodeDescription) -> Self {
        let mut stage = Self::new(config, renderer);
        stage.spawn_description(scene);
        stage
    }

    /// Загружает `models/<id>.json` и строит stage вокруг него
    pub async fn from_json(config: StageConfig, renderer: R, id: &str) -> SceneResult<Self> {
        let scene = loader::load_scene_description(config.model_path(id)).await?;
        Ok(Self::with_scene(config, renderer, &scene))
    }

    // ========================================================================
    // Physics
    // ========================================================================

    pub fn set_physics_objects(&mut self, objects: impl IntoIterator<Item = PhysicsObjectSnapshot>) {
        self.controller.set_physics_objects(objects);
    }

    pub fn set_physics_objects_json(&mut self, json: &str) -> SceneResult<usize> {
        self.controller.set_physics_objects_json(json)
    }

    pub fn connect_physics(&mut self, visual: Entity, physics_id: impl Into<PhysicsId>) {
        self.controller.connect(visual, physics_id);
    }

    pub fn disconnect_physics(&mut self, physics_id: impl Into<PhysicsId>) -> Option<Entity> {
        self.controller.disconnect(physics_id)
    }

    // ========================================================================
    // Prerender callbacks
    // ========================================================================

    pub fn on_prerender<M>(&mut self, system: impl IntoSystem<(), (), M> + 'static) -> TickHandle {
        self.controller.on_tick(system)
    }

    pub fn try_on_prerender<M>(&mut self, system: impl IntoSystem<(), CallbackResult, M> + 'static) -> TickHandle {
        self.controller.try_on_tick(system)
    }

    pub fn off_prerender(&mut self, handle: TickHandle) -> SceneResult<()> {
        self.controller.off_tick(handle)
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Один кадр (host animation frame)
    pub fn animate(&mut self) -> SceneResult<()> {
        self.controller.tick()
    }

    pub fn animate_at(&mut self, now_ms: f64) -> SceneResult<()> {
        self.controller.tick_at(now_ms)
    }

    /// Stereo render (cardboard): size = viewport, camera aspect обновляется
    pub fn use_cardboard(&mut self) {
        let (settings, viewport) = {
            let config = self.config();
            (config.stereo, config.viewport)
        };
        self.controller.use_stereo(settings);
        self.controller.set_size(viewport.width, viewport.height);

        let (aspect, camera) = (viewport.aspect(), self.rig.camera);
        if let Some(mut lens) = self.world_mut().get_mut::<CameraLens>(camera) {
            lens.aspect = aspect;
        }
        log("Render method: stereo");
    }

    /// Resize: render target + camera aspect
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.controller.set_size(width, height);
        let camera = self.rig.camera;
        if let Some(mut lens) = self.world_mut().get_mut::<CameraLens>(camera) {
            lens.aspect = if height == 0 { 1.0 } else { width as f32 / height as f32 };
        }
    }

    pub fn use_direct(&mut self) {
        self.controller.use_direct();
        log("Render method: direct");
    }

    // ========================================================================
    // Scene objects
    // ========================================================================

    /// Wireframe sphere (8×5), не прикреплена к сцене.
    /// Radius <= 0 (или NaN) - берётся 1.0
    pub fn add_sphere(&mut self, radius: f32) -> Entity {
        let radius = if radius > 0.0 { radius } else { DEFAULT_SPHERE_RADIUS };
        self.world_mut()
            .spawn((Name::new("Sphere"), SceneMesh::new(Geometry::sphere(radius), WIREFRAME)))
            .id()
    }

    /// Прикрепляет entity к scene root
    pub fn add_to_scene(&mut self, entity: Entity) {
        let root = self.scene_root;
        self.world_mut().entity_mut(entity).insert(ChildOf(root));
    }

    /// Async загрузка `models/<id>.json`; spawn - через `spawn_description`
    pub fn add_object(&self, id: &str) -> Task<SceneResult<NodeDescription>> {
        loader::load_scene_description(self.config().model_path(id))
    }

    /// Async загрузка одной geometry (`models/<id>.json`)
    pub fn add_single(&self, id: &str) -> Task<SceneResult<Geometry>> {
        loader::load_geometry(self.config().model_path(id))
    }

    /// Spawn загруженного описания под scene root
    pub fn spawn_description(&mut self, description: &NodeDescription) -> Entity {
        let root = self.scene_root;
        loader::spawn_description(self.world_mut(), description, Some(root))
    }

    pub fn pick_objects<S: AsRef<str>>(&self, root: Entity, names: &[S]) -> PickedObjects {
        pick::pick_objects(self.world(), root, names)
    }

    // ========================================================================
    // Camera
    // ========================================================================

    /// Tween камеры к destination: 500ms на единицу расстояния, quadratic ease-out
    pub fn walk_to(&mut self, destination: Vec3) {
        let camera = self.rig.camera;
        let from = self
            .world()
            .get::<Transform>(camera)
            .map(|transform| transform.translation)
            .unwrap_or_default();
        let duration_ms = WALK_MS_PER_UNIT * from.distance(destination) as f64;

        self.world_mut()
            .resource_mut::<Tweens>()
            .start(Tween::new(camera, from, destination, duration_ms, Easing::QuadraticOut));
    }

    /// Точка на высоте глаз над поверхностью под `point` (только `objects`)
    pub fn camera_position_above(&self, point: Vec3, objects: &[Entity]) -> SceneResult<Vec3> {
        let height = self
            .world()
            .get::<StageCamera>(self.rig.camera)
            .map(|camera| camera.height)
            .unwrap_or(self.config().camera.height);
        ground::camera_position_above(self.world(), point, height, objects)
    }

    // ========================================================================
    // Effects
    // ========================================================================

    /// count 0 - DEFAULT_STAR_COUNT
    pub fn use_stars(&mut self, count: usize) -> TickHandle {
        let count = if count == 0 { stars::DEFAULT_STAR_COUNT } else { count };
        let root = self.scene_root;
        spawn_star_field(self.world_mut(), root, count);
        self.controller.on_tick(rotate_star_fields)
    }

    pub fn use_default_stars(&mut self) -> TickHandle {
        self.use_stars(stars::DEFAULT_STAR_COUNT)
    }

    /// count 0 - DEFAULT_DUST_COUNT
    pub fn use_dust(&mut self, count: usize) -> TickHandle {
        let count = if count == 0 { dust::DEFAULT_DUST_COUNT } else { count };
        let root = self.scene_root;
        spawn_dust(self.world_mut(), root, count);
        self.controller.on_tick(scroll_dust)
    }

    pub fn use_default_dust(&mut self) -> TickHandle {
        self.use_dust(dust::DEFAULT_DUST_COUNT)
    }

    /// effect_size <= 0 (или NaN) даёт вырожденный transform - берётся DEFAULT_EFFECT_SIZE
    pub fn use_metaballs(&mut self, effect_size: f32) -> TickHandle {
        let effect_size = if effect_size > 0.0 { effect_size } else { metaballs::DEFAULT_EFFECT_SIZE };
        let (root, camera) = (self.scene_root, self.rig.camera);
        spawn_metaballs(self.world_mut(), root, camera, effect_size);
        self.controller.on_tick(update_metaballs)
    }

    pub fn use_default_metaballs(&mut self) -> TickHandle {
        self.use_metaballs(metaballs::DEFAULT_EFFECT_SIZE)
    }

    /// Fog из config (0x7B6B03, 1..40 по умолчанию)
    pub fn use_fog(&mut self) {
        let fog = SceneFog::from(self.config().fog);
        self.use_fog_with(fog);
    }

    pub fn use_fog_with(&mut self, fog: SceneFog) {
        self.world_mut().insert_resource(fog);
        self.controller.renderer_mut().set_clear_color(fog.color);
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Подключает device orientation к камере. Controller и callback создаются
    /// один раз; повторный вызов только переключает input element.
    pub fn device_orientation(&mut self, manual_control: bool) {
        let element = if manual_control {
            InputElement::Canvas
        } else {
            InputElement::Detached
        };
        let camera = self.rig.camera;

        let world = self.world_mut();
        if world.contains_resource::<DeviceOrientationController>() {
            let mut controller = world.resource_mut::<DeviceOrientationController>();
            controller.disconnect();
            controller.set_element(element);
            controller.connect();
        } else {
            let mut controller = DeviceOrientationController::new(camera, element);
            controller.connect();
            world.insert_resource(controller);
        }

        if self.orientation_callback.is_none() {
            self.orientation_callback = Some(self.controller.on_tick(update_device_orientation));
        }
    }

    /// Reading от host; false если device orientation не подключен
    pub fn push_device_orientation(&mut self, reading: DeviceOrientationReading) -> bool {
        self.world_mut()
            .get_resource_mut::<DeviceOrientationController>()
            .is_some_and(|mut controller| controller.push_reading(reading))
    }

    /// Orbit controls на камере (фокус - origin сцены)
    pub fn use_orbit(&mut self) {
        let camera = self.rig.camera;
        let world = self.world_mut();
        world.init_resource::<OrbitInput>();
        if world.get::<OrbitControls>(camera).is_none() {
            world.entity_mut(camera).insert(OrbitControls::default());
        }

        if self.orbit_callback.is_none() {
            self.orbit_callback = Some(self.controller.on_tick(orbit_camera_controls));
        }
    }

    pub fn orbit_drag(&mut self, delta: Vec2) {
        if let Some(mut input) = self.world_mut().get_resource_mut::<OrbitInput>() {
            input.drag(delta);
        }
    }

    pub fn orbit_scroll(&mut self, lines: f32) {
        if let Some(mut input) = self.world_mut().get_resource_mut::<OrbitInput>() {
            input.scroll(lines);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &StageConfig {
        self.world().resource::<StageConfig>()
    }

    pub fn scene_root(&self) -> Entity {
        self.scene_root
    }

    pub fn camera(&self) -> Entity {
        self.rig.camera
    }

    pub fn hud(&self) -> Entity {
        self.rig.hud
    }

    pub fn controller(&self) -> &FrameSyncController<R> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FrameSyncController<R> {
        &mut self.controller
    }

    pub fn renderer(&self) -> &R {
        self.controller.renderer()
    }

    pub fn world(&self) -> &World {
        self.controller.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.controller.world_mut()
    }
}
