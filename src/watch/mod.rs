// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling each task's registered watch patterns.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Optionally comparing content hashes so unchanged sources don't re-run
//!   a task.
//!
//! It only turns filesystem changes into task-level triggers; running the
//! tasks is the engine's job.

pub mod hash;
pub mod patterns;
pub mod watcher;

pub use hash::{compute_file_hash, compute_hash_for_paths, MemoryHashStore};
pub use patterns::{
    build_task_watch_profiles, collect_matching_files, validate_patterns, TaskWatchProfile,
};
pub use watcher::{matching_tasks, spawn_watcher, WatcherHandle};
