// src/tasks/mod.rs

//! Task kinds.
//!
//! Every declared operation becomes one [`TaskKind`] value. The orchestrator
//! only talks to the trait; the four implementations are:
//!
//! - [`files::FilesTask`]: copy sources into a directory, or concatenate
//!   them into one file.
//! - [`style::StyleTask`] and [`script::ScriptTask`]: bundle sources into one
//!   output, optionally through an external compiler and compression.
//! - [`callback::CallbackTask`]: run an arbitrary handler.

pub mod bundle;
pub mod callback;
pub mod files;
pub mod script;
pub mod style;

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use toml::{Table, Value};

use crate::engine::TaskName;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::paths::{DestinationSpec, Group};
use crate::runner::{TaskRunner, WatchSpec};
use crate::watch::validate_patterns;

pub use callback::{handler_fn, shell_handler, CallbackTask, TaskHandler};
pub use files::FilesTask;
pub use script::ScriptTask;
pub use style::StyleTask;

/// Future returned by a task body.
pub type TaskFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// The four supported operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Files,
    #[serde(alias = "less", alias = "css")]
    Style,
    #[serde(alias = "js")]
    Script,
    #[serde(rename = "task", alias = "callback")]
    Callback,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Files, Kind::Style, Kind::Script, Kind::Callback];

    /// Key of this kind's sub-table in `[config]`.
    pub fn config_key(self) -> &'static str {
        match self {
            Kind::Files => "files",
            Kind::Style => "style",
            Kind::Script => "script",
            Kind::Callback => "task",
        }
    }

    /// Candidate passed to the name allocator: the destination base name
    /// plus a kind suffix, or plain `task` for callbacks.
    pub fn name_candidate(self, base_name: &str) -> String {
        match self {
            Kind::Files => format!("{base_name}_files"),
            Kind::Style => format!("{base_name}_css"),
            Kind::Script => format!("{base_name}_js"),
            Kind::Callback => "task".to_string(),
        }
    }

    /// Naming group for generated destination names.
    pub fn group(self) -> Group {
        match self {
            Kind::Files | Kind::Callback => Group::FILES,
            Kind::Style => Group::CSS,
            Kind::Script => Group::JS,
        }
    }

    /// Built-in configuration, the lowest-precedence merge layer.
    pub fn builtin_defaults(self) -> Table {
        match self {
            Kind::Files => files::defaults(),
            Kind::Style => style::defaults(),
            Kind::Script => script::defaults(),
            Kind::Callback => Table::new(),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Everything the orchestrator resolved for one operation.
///
/// Built once per declaration and never mutated after registration.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDescriptor {
    pub identifier: TaskName,
    pub source_files: Vec<String>,
    pub destination: DestinationSpec,
    pub config: Table,
    pub kind: Kind,
}

impl TaskDescriptor {
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    pub fn config_bool(&self, key: &str) -> Option<bool> {
        self.config.get(key).and_then(Value::as_bool)
    }

    /// String list under `key`; a lone string counts as a one-item list.
    pub fn config_list(&self, key: &str) -> Vec<String> {
        match self.config.get(key) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Shared environment handed to [`TaskKind::init`].
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub fs: Arc<dyn FileSystem>,
    pub cwd: PathBuf,
    pub compress: bool,
    pub use_hash: bool,
}

impl TaskContext {
    /// Resolve a manifest-relative path against the working directory.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.cwd.join(rel)
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}

/// Capability set shared by every task kind.
pub trait TaskKind: Send + Sync + fmt::Debug {
    fn descriptor(&self) -> &TaskDescriptor;

    fn name(&self) -> &str {
        &self.descriptor().identifier
    }

    /// One-time setup before registration.
    fn init(&mut self, ctx: &TaskContext) -> Result<()>;

    /// The execution body handed to the runner.
    fn run(&self) -> TaskFuture<'_>;

    /// Register filesystem triggers that re-run this task.
    fn watch(&self, runner: &mut dyn TaskRunner);
}

/// Watch spec covering a task's own sources plus its `watch` config key.
pub(crate) fn source_watch_spec(descriptor: &TaskDescriptor, use_hash: bool) -> WatchSpec {
    let mut patterns: Vec<String> = descriptor
        .source_files
        .iter()
        .map(|f| globset::escape(f))
        .collect();
    patterns.extend(descriptor.config_list("watch"));

    WatchSpec {
        task: descriptor.identifier.clone(),
        patterns,
        use_hash,
    }
}

/// Fail init when the `watch` config key holds a pattern that does not parse.
pub(crate) fn check_watch_config(descriptor: &TaskDescriptor) -> Result<()> {
    validate_patterns(&descriptor.config_list("watch"))
}

/// Context captured at `init`, or an error when `run` is called too early.
pub(crate) fn initialised<'a>(
    ctx: &'a Option<TaskContext>,
    task: &str,
) -> Result<&'a TaskContext> {
    ctx.as_ref().ok_or_else(|| crate::errors::AssetdagError::TaskFailed {
        task: task.to_string(),
        reason: "task was run before init".to_string(),
    })
}
