//! VRSCENE Sync Core
//!
//! Physics → scene graph синхронизация на Bevy ECS (headless World).
//!
//! - physics: snapshots от внешней симуляции (wire format + PhysicsObjects resource)
//! - registry: PhysicsId → visual Entity (non-owning)
//! - dispatch: ordered tick callbacks с handles
//! - controller: FrameSyncController (sync → callbacks → render)
//! - render: RenderTarget seam, direct/stereo render methods, headless renderer

pub mod controller;
pub mod dispatch;
pub mod error;
pub mod logger;
pub mod physics;
pub mod registry;
pub mod render;
pub mod scene;
pub mod sync;

pub use controller::{create_headless_app, FrameSyncController};
pub use dispatch::{CallbackResult, TickCallbacks, TickHandle};
pub use error::{SceneError, SceneResult};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel,
    LogPrinter,
};
pub use physics::{
    parse_physics_batch, Orientation, PhysicsId, PhysicsMeta, PhysicsObjectSnapshot,
    PhysicsObjects, Position,
};
pub use registry::PhysicsRegistry;
pub use render::{
    CameraLens, CameraView, Eye, HeadlessRenderer, HexColor, RenderMethod, RenderTarget,
    RenderedFrame, StereoSettings, Viewport,
};
pub use scene::{world_position, world_transform, Drawable, SceneRoot};
pub use sync::{sync_physics_to_visuals, FrameClock};
