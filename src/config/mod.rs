// src/config/mod.rs

//! Manifest loading, validation and configuration merging.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a manifest from disk (`loader.rs`).
//! - Validate step declarations (`validate.rs`).
//! - Deep-merge configuration scopes (`merge.rs`).

pub mod loader;
pub mod merge;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_from_str};
pub use merge::{deep_merge, merged};
pub use model::{Manifest, RawManifest, Settings, StepConfig, DEFAULT_DEST, DEFAULT_NAME};
