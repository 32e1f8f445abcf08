// src/paths/mod.rs

//! Source expansion and destination decomposition.
//!
//! - [`expand`] turns user patterns into concrete file lists.
//! - [`destination`] splits a destination string into a [`DestinationSpec`].

pub mod destination;
pub mod expand;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::names::NameAllocator;

pub use destination::{split_extension, split_last_segment, DestinationSpec, Group};

/// Source patterns: a single pattern or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Sources {
    One(String),
    Many(Vec<String>),
}

impl Sources {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Sources::One(p) => vec![p],
            Sources::Many(ps) => ps,
        }
    }
}

impl From<&str> for Sources {
    fn from(p: &str) -> Self {
        Sources::One(p.to_string())
    }
}

impl From<String> for Sources {
    fn from(p: String) -> Self {
        Sources::One(p)
    }
}

impl From<Vec<String>> for Sources {
    fn from(ps: Vec<String>) -> Self {
        Sources::Many(ps)
    }
}

impl From<&[&str]> for Sources {
    fn from(ps: &[&str]) -> Self {
        Sources::Many(ps.iter().map(|p| p.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Sources {
    fn from(ps: [&str; N]) -> Self {
        Sources::Many(ps.iter().map(|p| p.to_string()).collect())
    }
}

/// Resolves source patterns and destinations for one orchestrator.
#[derive(Debug, Clone)]
pub struct PathResolver {
    fs: Arc<dyn FileSystem>,
    cwd: PathBuf,
}

impl PathResolver {
    pub fn new(fs: Arc<dyn FileSystem>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            cwd: cwd.into(),
        }
    }

    /// Working directory patterns are evaluated against.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Expand patterns into matching paths.
    ///
    /// Matches are concatenated in pattern order and never deduplicated; a
    /// pattern that matches nothing contributes nothing.
    pub fn expand<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let matched = expand::expand_pattern(self.fs.as_ref(), &self.cwd, pattern)?;
            debug!(pattern, count = matched.len(), "expanded source pattern");
            files.extend(matched);
        }
        Ok(files)
    }

    /// Decompose `raw` into a [`DestinationSpec`].
    ///
    /// Never fails: missing pieces default to `dest_root` and to the next
    /// generated base name of `group`.
    pub fn resolve_destination(
        &self,
        raw: &str,
        is_file_target: bool,
        group: Group,
        dest_root: &str,
        names: &mut NameAllocator,
    ) -> DestinationSpec {
        destination::resolve(raw, is_file_target, group, dest_root, names)
    }
}
