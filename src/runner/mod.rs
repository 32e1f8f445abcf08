// src/runner/mod.rs

//! Task runner contract and the in-process implementation.
//!
//! The orchestrator only needs [`TaskRunner`]: it registers executable tasks,
//! aggregate meta-tasks and watch triggers. [`Runner`] is the concrete
//! registry that later executes what was registered.

pub mod registry;

use std::sync::Arc;

use crate::engine::TaskName;
use crate::tasks::TaskKind;

pub use registry::{RunReport, Runner};

/// Filesystem trigger for one task: any change to a path matching one of
/// `patterns` (relative to the watch root) re-runs `task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSpec {
    pub task: TaskName,
    pub patterns: Vec<String>,
    /// Only trigger when the content hash of the matched files changed.
    pub use_hash: bool,
}

/// What the orchestrator needs from a task runner.
pub trait TaskRunner {
    /// Register an executable unit under `name`, replacing any previous one.
    fn register_task(&mut self, name: &str, body: Arc<dyn TaskKind>);

    /// Define (or redefine) a meta-task running `members` in order.
    fn register_aggregate(&mut self, name: &str, members: Vec<TaskName>);

    /// Register a filesystem trigger.
    fn register_watch(&mut self, spec: WatchSpec);
}
