//! FrameSyncController integration тесты
//!
//! Проверяем:
//! - sync копирует ровно mapped entries
//! - unmapped id не паникует и ничего не трогает
//! - повторный connect заменяет mapping
//! - callbacks по порядку регистрации, ошибка прерывает кадр (без render)

use bevy::prelude::*;
use proptest::prelude::*;
use vrscene_sync::*;

/// Helper: controller с камерой и headless renderer
fn create_controller() -> FrameSyncController<HeadlessRenderer> {
    let mut app = create_headless_app();
    let camera = app
        .world_mut()
        .spawn((Transform::default(), CameraLens::default()))
        .id();
    FrameSyncController::new(app, camera, HeadlessRenderer::new(640, 480), (640, 480))
}

fn spawn_node(controller: &mut FrameSyncController<HeadlessRenderer>) -> Entity {
    controller.world_mut().spawn((Transform::default(), Drawable)).id()
}

fn translation(controller: &FrameSyncController<HeadlessRenderer>, entity: Entity) -> Vec3 {
    controller.world().get::<Transform>(entity).unwrap().translation
}

#[derive(Resource, Default)]
struct CallLog(Vec<&'static str>);

#[test]
fn test_example_single_object() {
    let mut controller = create_controller();
    let node_a = spawn_node(&mut controller);

    controller.set_physics_objects(vec![PhysicsObjectSnapshot::new("a", Vec3::new(1.0, 2.0, 3.0))]);
    controller.connect(node_a, "a");
    controller.tick_at(0.0).unwrap();

    assert_eq!(translation(&controller, node_a), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_unmapped_ids_are_skipped() {
    let mut controller = create_controller();
    let node = spawn_node(&mut controller);
    controller.world_mut().get_mut::<Transform>(node).unwrap().translation = Vec3::splat(9.0);

    controller.set_physics_objects(vec![
        PhysicsObjectSnapshot::new("ghost", Vec3::ONE),
        PhysicsObjectSnapshot::new(42i64, Vec3::ONE),
    ]);
    controller.tick_at(0.0).unwrap();

    assert_eq!(translation(&controller, node), Vec3::splat(9.0));
}

#[test]
fn test_reconnect_replaces_mapping() {
    let mut controller = create_controller();
    let old_node = spawn_node(&mut controller);
    let new_node = spawn_node(&mut controller);

    controller.connect(old_node, "a");
    controller.connect(new_node, "a");
    controller.set_physics_objects(vec![PhysicsObjectSnapshot::new("a", Vec3::new(4.0, 5.0, 6.0))]);
    controller.tick_at(0.0).unwrap();

    assert_eq!(translation(&controller, new_node), Vec3::new(4.0, 5.0, 6.0));
    assert_eq!(translation(&controller, old_node), Vec3::ZERO);
}

#[test]
fn test_disconnect_stops_sync() {
    let mut controller = create_controller();
    let node = spawn_node(&mut controller);

    controller.connect(node, 7i64);
    assert_eq!(controller.disconnect(7i64), Some(node));
    controller.set_physics_objects(vec![PhysicsObjectSnapshot::new(7i64, Vec3::ONE)]);
    controller.tick_at(0.0).unwrap();

    assert_eq!(translation(&controller, node), Vec3::ZERO);
}

#[test]
fn test_callbacks_run_in_registration_order_once() {
    let mut controller = create_controller();
    controller.world_mut().init_resource::<CallLog>();

    controller.on_tick(|mut log: ResMut<CallLog>| log.0.push("tweens"));
    controller.on_tick(|mut log: ResMut<CallLog>| log.0.push("stars"));
    controller.on_tick(|mut log: ResMut<CallLog>| log.0.push("dust"));

    controller.tick_at(0.0).unwrap();
    assert_eq!(controller.world().resource::<CallLog>().0, vec!["tweens", "stars", "dust"]);
    assert_eq!(controller.renderer().frames_rendered(), 1);
}

#[test]
fn test_callbacks_observe_synced_positions() {
    let mut controller = create_controller();
    let node = spawn_node(&mut controller);
    controller.connect(node, "marker");

    #[derive(Resource, Default)]
    struct Seen(Option<Vec3>);
    controller.world_mut().init_resource::<Seen>();

    let marker = node;
    controller.on_tick(move |transforms: Query<&Transform>, mut seen: ResMut<Seen>| {
        seen.0 = transforms.get(marker).ok().map(|t| t.translation);
    });

    controller.set_physics_objects(vec![PhysicsObjectSnapshot::new("marker", Vec3::X)]);
    controller.tick_at(0.0).unwrap();

    assert_eq!(controller.world().resource::<Seen>().0, Some(Vec3::X));
}

#[test]
fn test_failing_callback_aborts_rest_and_render() {
    let mut controller = create_controller();
    controller.world_mut().init_resource::<CallLog>();

    controller.on_tick(|mut log: ResMut<CallLog>| log.0.push("before"));
    controller.try_on_tick(|| -> CallbackResult { Err(SceneError::Callback("effect exploded".into())) });
    controller.on_tick(|mut log: ResMut<CallLog>| log.0.push("after"));

    let err = controller.tick_at(0.0).unwrap_err();
    assert!(matches!(err, SceneError::Callback(_)));
    assert_eq!(controller.world().resource::<CallLog>().0, vec!["before"]);
    assert_eq!(controller.renderer().frames_rendered(), 0);
}

#[test]
fn test_off_tick_removes_callback() {
    let mut controller = create_controller();
    controller.world_mut().init_resource::<CallLog>();

    let handle = controller.on_tick(|mut log: ResMut<CallLog>| log.0.push("removed"));
    controller.on_tick(|mut log: ResMut<CallLog>| log.0.push("kept"));
    controller.off_tick(handle).unwrap();
    assert!(controller.off_tick(handle).is_err());

    controller.tick_at(0.0).unwrap();
    assert_eq!(controller.world().resource::<CallLog>().0, vec!["kept"]);
    assert_eq!(controller.callback_count(), 1);
}

#[test]
fn test_frame_clock_advances() {
    let mut controller = create_controller();
    controller.tick_at(1_000.0).unwrap();
    controller.tick_at(1_016.0).unwrap();

    let clock = *controller.world().resource::<FrameClock>();
    assert_eq!(clock.frame, 2);
    assert_eq!(clock.now_ms, 1_016.0);
}

#[test]
fn test_stereo_switch_renders_two_views() {
    let mut controller = create_controller();
    controller.use_stereo(StereoSettings::default());
    controller.tick_at(0.0).unwrap();

    assert_eq!(controller.renderer().frames_rendered(), 2);
    let eyes: Vec<Eye> = controller.renderer().history().map(|f| f.eye).collect();
    assert_eq!(eyes, vec![Eye::Left, Eye::Right]);

    controller.use_direct();
    controller.tick_at(16.0).unwrap();
    assert_eq!(controller.renderer().frames_rendered(), 3);
}

#[test]
fn test_json_batch_feeds_sync() {
    let mut controller = create_controller();
    let node = spawn_node(&mut controller);
    controller.connect(node, 3i64);

    let accepted = controller
        .set_physics_objects_json(r#"[{"id": 3, "position": {"x": 0.5, "y": 1.5, "z": -2}}, {"id": 4}]"#)
        .unwrap();
    assert_eq!(accepted, 1);

    controller.tick_at(0.0).unwrap();
    assert_eq!(translation(&controller, node), Vec3::new(0.5, 1.5, -2.0));
}

#[test]
fn test_despawned_visual_is_skipped_then_pruned() {
    let mut controller = create_controller();
    let kept = spawn_node(&mut controller);
    let gone = spawn_node(&mut controller);
    controller.connect(kept, "kept");
    controller.connect(gone, "gone");
    controller.world_mut().despawn(gone);

    controller.set_physics_objects(vec![
        PhysicsObjectSnapshot::new("kept", Vec3::X),
        PhysicsObjectSnapshot::new("gone", Vec3::Y),
    ]);
    controller.tick_at(0.0).unwrap();
    assert_eq!(translation(&controller, kept), Vec3::X);

    assert_eq!(controller.prune_despawned(), 1);
    assert_eq!(controller.prune_despawned(), 0);
    assert_eq!(controller.world().resource::<PhysicsRegistry>().len(), 1);
}

proptest! {
    /// Sync копирует ровно mapped entries: mapped → позиция snapshot'а,
    /// unmapped snapshots ничего не меняют
    #[test]
    fn prop_sync_copies_exactly_mapped(
        positions in prop::collection::vec((-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0), 1..16),
        mapped_mask in prop::collection::vec(any::<bool>(), 16),
    ) {
        let mut controller = create_controller();
        let nodes: Vec<Entity> = positions.iter().map(|_| spawn_node(&mut controller)).collect();

        for (i, node) in nodes.iter().enumerate() {
            if mapped_mask[i] {
                controller.connect(*node, i as i64);
            }
        }

        controller.set_physics_objects(
            positions
                .iter()
                .enumerate()
                .map(|(i, (x, y, z))| PhysicsObjectSnapshot::new(i as i64, Vec3::new(*x, *y, *z))),
        );
        controller.tick_at(0.0).unwrap();

        for (i, node) in nodes.iter().enumerate() {
            let (x, y, z) = positions[i];
            let expected = if mapped_mask[i] { Vec3::new(x, y, z) } else { Vec3::ZERO };
            prop_assert_eq!(translation(&controller, *node), expected);
        }
    }
}
