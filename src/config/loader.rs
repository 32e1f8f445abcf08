// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{Manifest, RawManifest};
use crate::errors::Result;

/// Load a manifest from a given path and return the raw `RawManifest`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let contents = fs::read_to_string(path.as_ref())?;
    load_from_str(&contents)
}

/// Deserialize a manifest from TOML text.
pub fn load_from_str(contents: &str) -> Result<RawManifest> {
    let raw: RawManifest = toml::from_str(contents)?;
    Ok(raw)
}

/// Load a manifest from path and validate it.
///
/// - Reads TOML.
/// - Checks global `[config]` value types.
/// - Checks every `[[step]]` has what its kind needs.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest> {
    let raw = load_from_path(&path)?;
    Manifest::try_from(raw)
}

/// `Assetfile.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Assetfile.toml")
}
