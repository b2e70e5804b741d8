//! pick_objects и global logger
//!
//! Logger глобальный на процесс: тесты идут через SERIAL, printer ставится
//! заново в каждом тесте, учитываются только сообщения pick.

use bevy::prelude::*;
use std::sync::{Arc, Mutex};

use vrscene_stage::pick_objects;
use vrscene_sync::{set_log_level, set_logger, LogLevel, LogPrinter};

static SERIAL: Mutex<()> = Mutex::new(());

type Captured = Arc<Mutex<Vec<(LogLevel, String)>>>;

struct CapturePrinter {
    captured: Captured,
}

impl LogPrinter for CapturePrinter {
    fn log(&self, level: LogLevel, message: &str) {
        self.captured.lock().unwrap().push((level, message.to_string()));
    }
}

fn capture_logs() -> Captured {
    let captured = Captured::default();
    set_log_level(LogLevel::Debug);
    set_logger(Box::new(CapturePrinter { captured: captured.clone() }));
    captured
}

fn pick_messages(captured: &Captured) -> Vec<(LogLevel, String)> {
    captured
        .lock()
        .unwrap()
        .iter()
        .filter(|(_, message)| message.contains("Not all objects found"))
        .cloned()
        .collect()
}

/// root → body → (head, arm → left_hand)
fn figure(world: &mut World, with_hand: bool) -> Entity {
    let root = world.spawn(Name::new("root")).id();
    let body = world.spawn((Name::new("body"), ChildOf(root))).id();
    world.spawn((Name::new("head"), ChildOf(body)));
    let arm = world.spawn((Name::new("arm"), ChildOf(body))).id();
    if with_hand {
        world.spawn((Name::new("left_hand"), ChildOf(arm)));
    }
    root
}

#[test]
fn test_full_match_logs_nothing() {
    let _serial = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let captured = capture_logs();

    let mut world = World::new();
    let root = figure(&mut world, true);
    let picked = pick_objects(&world, root, &["head", "left_hand", "head"]);

    assert_eq!(picked.found.len(), 2);
    assert!(pick_messages(&captured).is_empty(), "unexpected: {:?}", pick_messages(&captured));
    assert!(captured.lock().unwrap().iter().all(|(level, _)| *level < LogLevel::Warning));
}

#[test]
fn test_partial_match_warns_once_with_missing_name() {
    let _serial = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let captured = capture_logs();

    let mut world = World::new();
    let root = figure(&mut world, false);
    let picked = pick_objects(&world, root, &["head", "left_hand"]);

    assert!(picked.get("head").is_some());
    assert_eq!(picked.missing, vec!["left_hand".to_string()]);

    let messages = pick_messages(&captured);
    assert_eq!(messages.len(), 1, "messages: {:?}", messages);
    assert_eq!(messages[0].0, LogLevel::Warning);
    assert!(messages[0].1.contains("left_hand"));
}
