// src/paths/expand.rs

//! Source pattern expansion.
//!
//! Patterns are evaluated against the filesystem relative to the resolver's
//! working directory. `*` and `?` stay inside one path segment, `**` crosses
//! segments. Only the directory below the pattern's literal prefix is walked.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobMatcher};
use tracing::{debug, trace};

use crate::errors::{AssetdagError, Result};
use crate::fs::FileSystem;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Returns true if `pattern` contains any glob metacharacter.
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(GLOB_META)
}

/// Expand a single pattern into matching paths, sorted.
pub(crate) fn expand_pattern(
    fs: &dyn FileSystem,
    cwd: &Path,
    pattern: &str,
) -> Result<Vec<String>> {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);

    if !is_glob(pattern) {
        let exists = fs.exists(&cwd.join(pattern));
        trace!(pattern, exists, "literal source pattern");
        return Ok(if exists {
            vec![pattern.to_string()]
        } else {
            Vec::new()
        });
    }

    let matcher = compile(pattern)?;
    let absolute = Path::new(pattern).is_absolute();

    let prefix = literal_prefix(pattern);
    let base = match (prefix.is_empty(), absolute) {
        (true, true) => PathBuf::from("/"),
        (true, false) => cwd.to_path_buf(),
        (false, _) => cwd.join(&prefix),
    };

    if !fs.is_dir(&base) {
        debug!(pattern, ?base, "pattern base directory does not exist");
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    let mut stack = vec![base];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            let candidate = if absolute {
                slashed(&path)
            } else {
                match path.strip_prefix(cwd) {
                    Ok(rel) => slashed(rel),
                    Err(_) => continue,
                }
            };

            if fs.is_dir(&path) {
                stack.push(path);
            }
            if matcher.is_match(&candidate) {
                matches.push(candidate);
            }
        }
    }

    matches.sort();
    Ok(matches)
}

/// Parse `pattern` with the matching rules shared by sources and watches:
/// `*` and `?` stop at `/`.
pub fn build_glob(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| AssetdagError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.kind().to_string(),
        })
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    Ok(build_glob(pattern)?.compile_matcher())
}

/// Leading directory segments that contain no glob metacharacters.
///
/// `assets/less/**/*.less` -> `assets/less`, `*.js` -> ``, `/srv/*.css` -> `/srv`.
pub(crate) fn literal_prefix(pattern: &str) -> String {
    let segments: Vec<&str> = pattern.split('/').collect();
    let dirs = &segments[..segments.len().saturating_sub(1)];
    dirs.iter()
        .take_while(|s| !is_glob(s))
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

pub(crate) fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
