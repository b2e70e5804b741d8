//! Поиск узлов по имени (depth-first по Children)

use bevy::prelude::*;
use std::collections::HashMap;

use vrscene_sync::log_warning;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickedObjects {
    pub found: HashMap<String, Entity>,
    /// В порядке запроса
    pub missing: Vec<String>,
}

impl PickedObjects {
    pub fn get(&self, name: &str) -> Option<Entity> {
        self.found.get(name).copied()
    }
}

/// Каждое имя забирается один раз (первое совпадение в DFS порядке).
/// Повторы в запросе схлопываются, порядок - по первому вхождению.
/// В ребёнка спускаемся, только пока остались искомые имена.
pub fn pick_objects<S: AsRef<str>>(world: &World, root: Entity, names: &[S]) -> PickedObjects {
    let mut remaining: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        if !remaining.iter().any(|wanted| wanted == name) {
            remaining.push(name.to_string());
        }
    }
    let mut found = HashMap::new();

    visit(world, root, &mut remaining, &mut found);

    if let Some(first) = remaining.first() {
        log_warning(&format!("Not all objects found: {} missing", first));
    }

    PickedObjects {
        found,
        missing: remaining,
    }
}

fn visit(world: &World, entity: Entity, remaining: &mut Vec<String>, found: &mut HashMap<String, Entity>) {
    let Some(children) = world.get::<Children>(entity) else {
        return;
    };

    for child in children.to_vec() {
        if let Some(name) = world.get::<Name>(child) {
            if let Some(index) = remaining.iter().position(|wanted| wanted == name.as_str()) {
                found.insert(remaining.remove(index), child);
            }
        }
        if remaining.is_empty() {
            return;
        }
        visit(world, child, remaining, found);
    }
}
