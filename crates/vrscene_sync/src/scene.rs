//! Scene graph helpers (World + ChildOf hierarchy)
//!
//! Transform propagation plugin не подключён (headless MinimalPlugins),
//! поэтому world transform считаем по цепочке ChildOf на лету.

use bevy::prelude::*;

/// Drawable marker: entity которую renderer рисует (mesh, point cloud, field)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Drawable;

/// Root scene graph'а
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SceneRoot;

/// World transform entity (composition по ChildOf цепочке).
///
/// None если у entity нет Transform. Родитель без Transform = identity.
pub fn world_transform(world: &World, entity: Entity) -> Option<GlobalTransform> {
    let local = *world.get::<Transform>(entity)?;

    let parent_global = world
        .get::<ChildOf>(entity)
        .and_then(|child_of| world_transform(world, child_of.parent()))
        .unwrap_or(GlobalTransform::IDENTITY);

    Some(parent_global.mul_transform(local))
}

/// World position entity (translation из world transform)
pub fn world_position(world: &World, entity: Entity) -> Option<Vec3> {
    world_transform(world, entity).map(|global| global.translation())
}
