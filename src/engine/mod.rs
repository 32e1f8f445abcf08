// src/engine/mod.rs

//! Watch-mode event loop.
//!
//! After the initial run, the runtime reacts to:
//! - file-watch triggers
//! - task completion events
//! - shutdown signals
//!
//! A trigger for a task that is still running is coalesced into a single
//! pending rerun.

pub mod runtime;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Result of one task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(String),
}

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// A watched file changed.
    FileWatch,
}

/// Events flowing into the runtime from the watcher, task executions and
/// the Ctrl-C handler.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    ShutdownRequested,
}

/// Options that influence how the runtime behaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit once nothing is running and nothing is pending.
    pub exit_when_idle: bool,
    /// Stop with an error on the first failed task (production mode).
    pub fail_fast: bool,
}

pub use runtime::Runtime;
