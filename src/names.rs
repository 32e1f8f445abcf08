// src/names.rs

//! Task identifiers and default output base names.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::engine::TaskName;

/// Issued identifiers plus one counter per naming group.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    issued: HashSet<TaskName>,
    group_counters: HashMap<String, u32>,
}

impl NameRegistry {
    pub fn contains(&self, name: &str) -> bool {
        self.issued.contains(name)
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}

/// Allocates task identifiers and group default base names.
///
/// Collision handling checks once: a taken `_x` becomes `_x2`, a taken
/// `_x7` becomes `_x8`, and the result is accepted without a second check.
#[derive(Debug, Clone)]
pub struct NameAllocator {
    registry: NameRegistry,
    default_base: String,
}

impl NameAllocator {
    pub fn new(default_base: impl Into<String>) -> Self {
        Self {
            registry: NameRegistry::default(),
            default_base: default_base.into(),
        }
    }

    /// Base used by [`allocate_group_default`](Self::allocate_group_default).
    pub fn set_default_base(&mut self, base: impl Into<String>) {
        self.default_base = base.into();
    }

    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    /// Identifier `_<candidate>`, bumped once if already issued.
    pub fn allocate_task_name(&mut self, candidate: &str) -> TaskName {
        let mut name = format!("_{candidate}");

        if self.registry.contains(&name) {
            let bumped = bump_trailing_number(&name);
            debug!(original = %name, bumped = %bumped, "task name collision");
            name = bumped;
        }

        self.registry.issued.insert(name.clone());
        name
    }

    /// Next default base name for `group`: `app`, `app2`, `app3`, ...
    pub fn allocate_group_default(&mut self, group: &str) -> String {
        let counter = self
            .registry
            .group_counters
            .entry(group.to_string())
            .or_insert(0);
        *counter += 1;

        if *counter > 1 {
            format!("{}{}", self.default_base, counter)
        } else {
            self.default_base.clone()
        }
    }
}

/// Increment a trailing decimal numeral, or append `2` if there is none.
fn bump_trailing_number(name: &str) -> String {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &name[stem.len()..];

    if digits.is_empty() {
        return format!("{name}2");
    }

    match digits.parse::<u64>() {
        Ok(n) => format!("{stem}{}", n.saturating_add(1)),
        // More digits than fit in a u64: treat it as opaque text.
        Err(_) => format!("{name}2"),
    }
}
