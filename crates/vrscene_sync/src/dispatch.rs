//! Per-frame dispatcher: ordered callback list для события "prerender"
//!
//! Callbacks = зарегистрированные one-shot Bevy systems (`World::register_system`).
//! Снаружи они "zero-argument": доступ к данным объявляется system params.
//! Порядок вызова = порядок регистрации. Удаление - по `TickHandle`.

use bevy::ecs::system::SystemId;
use bevy::prelude::*;

use crate::error::{SceneError, SceneResult};

/// Handle на зарегистрированный tick callback (для `off_tick`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickHandle(u64);

/// Output fallible callback'а
pub type CallbackResult = Result<(), SceneError>;

#[derive(Debug, Clone, Copy)]
enum TickCallback {
    Infallible(SystemId),
    Fallible(SystemId<(), CallbackResult>),
}

#[derive(Debug, Default)]
pub struct TickCallbacks {
    entries: Vec<(TickHandle, TickCallback)>,
    next_handle: u64,
}

impl TickCallbacks {
    pub fn push<M>(
        &mut self,
        world: &mut World,
        system: impl IntoSystem<(), (), M> + 'static,
    ) -> TickHandle {
        let id = world.register_system(system);
        self.append(TickCallback::Infallible(id))
    }

    pub fn push_fallible<M>(
        &mut self,
        world: &mut World,
        system: impl IntoSystem<(), CallbackResult, M> + 'static,
    ) -> TickHandle {
        let id = world.register_system(system);
        self.append(TickCallback::Fallible(id))
    }

    fn append(&mut self, callback: TickCallback) -> TickHandle {
        let handle = TickHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push((handle, callback));
        handle
    }

    /// Удаляет callback и unregister'ит его system
    pub fn remove(&mut self, world: &mut World, handle: TickHandle) -> SceneResult<()> {
        let index = self
            .entries
            .iter()
            .position(|(h, _)| *h == handle)
            .ok_or(SceneError::UnknownCallback(handle))?;

        let (_, callback) = self.entries.remove(index);
        let unregistered = match callback {
            TickCallback::Infallible(id) => world.unregister_system(id).map(|_| ()).map_err(|e| format!("{e:?}")),
            TickCallback::Fallible(id) => world.unregister_system(id).map(|_| ()).map_err(|e| format!("{e:?}")),
        };
        unregistered.map_err(SceneError::Callback)
    }

    /// Запускает все callbacks по порядку регистрации.
    ///
    /// Первая ошибка прерывает оставшиеся callbacks (изоляции нет).
    pub fn run_all(&self, world: &mut World) -> SceneResult<()> {
        for (handle, callback) in &self.entries {
            match *callback {
                TickCallback::Infallible(id) => {
                    world
                        .run_system(id)
                        .map_err(|e| SceneError::Callback(format!("{handle:?}: {e:?}")))?;
                }
                TickCallback::Fallible(id) => {
                    world
                        .run_system(id)
                        .map_err(|e| SceneError::Callback(format!("{handle:?}: {e:?}")))??;
                }
            }
        }
        Ok(())
    }

    pub fn handles(&self) -> impl Iterator<Item = TickHandle> + '_ {
        self.entries.iter().map(|(handle, _)| *handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct CallLog(Vec<&'static str>);

    #[test]
    fn test_run_in_registration_order() {
        let mut world = World::new();
        world.init_resource::<CallLog>();

        let mut callbacks = TickCallbacks::default();
        callbacks.push(&mut world, |mut log: ResMut<CallLog>| log.0.push("first"));
        callbacks.push(&mut world, |mut log: ResMut<CallLog>| log.0.push("second"));
        callbacks.push(&mut world, |mut log: ResMut<CallLog>| log.0.push("third"));

        callbacks.run_all(&mut world).unwrap();
        assert_eq!(world.resource::<CallLog>().0, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_failure_aborts_remaining() {
        let mut world = World::new();
        world.init_resource::<CallLog>();

        let mut callbacks = TickCallbacks::default();
        callbacks.push(&mut world, |mut log: ResMut<CallLog>| log.0.push("before"));
        callbacks.push_fallible(&mut world, || -> CallbackResult {
            Err(SceneError::Callback("boom".to_string()))
        });
        callbacks.push(&mut world, |mut log: ResMut<CallLog>| log.0.push("after"));

        let err = callbacks.run_all(&mut world).unwrap_err();
        assert!(matches!(err, SceneError::Callback(ref msg) if msg == "boom"));
        assert_eq!(world.resource::<CallLog>().0, vec!["before"]);
    }

    #[test]
    fn test_remove_by_handle() {
        let mut world = World::new();
        world.init_resource::<CallLog>();

        let mut callbacks = TickCallbacks::default();
        let a = callbacks.push(&mut world, |mut log: ResMut<CallLog>| log.0.push("a"));
        let b = callbacks.push(&mut world, |mut log: ResMut<CallLog>| log.0.push("b"));
        assert_ne!(a, b);

        callbacks.remove(&mut world, a).unwrap();
        assert!(matches!(
            callbacks.remove(&mut world, a),
            Err(SceneError::UnknownCallback(h)) if h == a
        ));

        callbacks.run_all(&mut world).unwrap();
        assert_eq!(world.resource::<CallLog>().0, vec!["b"]);
        assert_eq!(callbacks.handles().collect::<Vec<_>>(), vec![b]);
    }
}
