// src/watch/patterns.rs

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobSet, GlobSetBuilder};

use crate::engine::TaskName;
use crate::fs::FileSystem;
use crate::paths::expand::{build_glob, is_glob, literal_prefix, slashed};
use crate::runner::WatchSpec;

/// Compiled watch patterns for a single task.
///
/// Patterns are anchored at the watch root when built, so a source such as
/// `../shared/*.less` becomes a pattern over the normalised path of the
/// sibling directory. Paths handed to [`matches_path`](Self::matches_path)
/// go through the same normalisation.
#[derive(Clone)]
pub struct TaskWatchProfile {
    name: TaskName,
    patterns: Vec<String>,
    roots: Vec<PathBuf>,
    watch_set: GlobSet,
    use_hash: bool,
}

impl fmt::Debug for TaskWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskWatchProfile")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl TaskWatchProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn use_hash(&self) -> bool {
        self.use_hash
    }

    /// Anchored patterns, after normalisation.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Directories below which every match of this profile lives.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Returns true if this task is interested in an already normalised path.
    pub fn matches(&self, normalized: &str) -> bool {
        self.watch_set.is_match(normalized)
    }

    pub fn matches_path(&self, path: &Path) -> bool {
        self.matches(&normalize_path(path))
    }
}

/// Check that every pattern compiles.
pub fn validate_patterns(patterns: &[String]) -> crate::errors::Result<()> {
    for pattern in patterns {
        build_glob(pattern.strip_prefix("./").unwrap_or(pattern))?;
    }
    Ok(())
}

/// Compile one profile per task, anchored at `root`.
///
/// Several specs for the same task are merged into one profile.
pub fn build_task_watch_profiles(
    root: &Path,
    specs: &[WatchSpec],
) -> Result<Vec<TaskWatchProfile>> {
    let mut merged: Vec<(TaskName, Vec<String>, bool)> = Vec::new();
    for spec in specs {
        match merged.iter_mut().find(|(name, _, _)| *name == spec.task) {
            Some((_, patterns, use_hash)) => {
                patterns.extend(spec.patterns.iter().cloned());
                *use_hash |= spec.use_hash;
            }
            None => merged.push((spec.task.clone(), spec.patterns.clone(), spec.use_hash)),
        }
    }

    let mut profiles = Vec::with_capacity(merged.len());
    for (name, patterns, use_hash) in merged {
        let patterns: Vec<String> = patterns
            .iter()
            .map(|p| anchor_pattern(root, p))
            .collect();
        let watch_set = build_globset(&patterns)
            .with_context(|| format!("building watch globset for task {name}"))?;
        let roots = pattern_roots(&patterns);
        profiles.push(TaskWatchProfile {
            name,
            patterns,
            roots,
            watch_set,
            use_hash,
        });
    }
    Ok(profiles)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(build_glob(pat)?);
    }
    Ok(builder.build()?)
}

/// Join a relative pattern onto `root` and fold `.` and `..` segments.
///
/// `("/site", "../shared/*.less")` -> `/shared/*.less`,
/// `(".", "./assets/**")` -> `assets/**`.
pub fn anchor_pattern(root: &Path, pattern: &str) -> String {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    if Path::new(pattern).is_absolute() {
        return normalize_str(pattern);
    }
    let root = globset::escape(&slashed(root));
    normalize_str(&format!("{root}/{pattern}"))
}

/// Lexically normalised, slash-separated form of `path`.
pub fn normalize_path(path: &Path) -> String {
    normalize_str(&slashed(path))
}

fn normalize_str(s: &str) -> String {
    let absolute = s.starts_with('/');
    let mut out: Vec<&str> = Vec::new();
    for segment in s.split('/') {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(last) if *last != ".." && !is_glob(last) => {
                    out.pop();
                }
                None if absolute => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }

    let joined = out.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Deepest literal directory of each pattern, deduplicated.
fn pattern_roots(patterns: &[String]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let prefix = literal_prefix(pattern);
        let root = match (prefix.is_empty(), pattern.starts_with('/')) {
            (true, true) => PathBuf::from("/"),
            (true, false) => PathBuf::from("."),
            (false, _) => PathBuf::from(prefix),
        };
        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    roots
}

/// Collect all files matching this profile, walking only its roots.
///
/// Used when computing content hashes for `use_hash` profiles.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    profile: &TaskWatchProfile,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<PathBuf> = profile.roots().to_vec();

    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) || !fs.is_dir(&dir) {
            continue;
        }
        for path in fs.read_dir(&dir)? {
            let path = PathBuf::from(normalize_path(&path));
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) && profile.matches_path(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn spec(task: &str, patterns: &[&str]) -> WatchSpec {
        WatchSpec {
            task: task.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            use_hash: false,
        }
    }

    #[test]
    fn specs_for_one_task_are_merged() {
        let profiles = build_task_watch_profiles(
            Path::new("/p"),
            &[
                spec("_app_css", &["assets/less/app.less"]),
                spec("_app_js", &["assets/js/*.js"]),
                spec("_app_css", &["assets/less/**/*.less"]),
            ],
        )
        .unwrap();

        assert_eq!(profiles.len(), 2);
        let css = &profiles[0];
        assert_eq!(css.name(), "_app_css");
        assert!(css.matches("/p/assets/less/app.less"));
        assert!(css.matches("/p/assets/less/partials/vars.less"));
        assert!(!css.matches("/p/assets/js/app.js"));
        assert_eq!(css.roots(), [PathBuf::from("/p/assets/less")]);
    }

    #[test]
    fn star_stays_in_one_segment() {
        let profiles =
            build_task_watch_profiles(Path::new("/p"), &[spec("_t", &["src/*.rs"])]).unwrap();
        assert!(profiles[0].matches_path(Path::new("/p/src/main.rs")));
        assert!(!profiles[0].matches_path(Path::new("/p/src/a/b.rs")));
    }

    #[test]
    fn parent_relative_patterns_are_anchored() {
        assert_eq!(
            anchor_pattern(Path::new("/work/site"), "../shared/*.less"),
            "/work/shared/*.less"
        );
        assert_eq!(anchor_pattern(Path::new("."), "./assets/**"), "assets/**");
        assert_eq!(anchor_pattern(Path::new("/work"), "/abs/x.css"), "/abs/x.css");
        assert_eq!(anchor_pattern(Path::new("."), "../up.css"), "../up.css");

        let profiles = build_task_watch_profiles(
            Path::new("/work/site"),
            &[spec("_app_css", &["../shared/*.less"])],
        )
        .unwrap();
        assert_eq!(profiles[0].roots(), [PathBuf::from("/work/shared")]);
        assert!(profiles[0].matches_path(Path::new("/work/site/../shared/x.less")));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(build_task_watch_profiles(Path::new("."), &[spec("_x", &["a/[b"])]).is_err());
        assert!(validate_patterns(&["a/[b".to_string()]).is_err());
        assert!(validate_patterns(&["./a/**/*.css".to_string()]).is_ok());
    }

    #[test]
    fn collects_files_from_mock_fs() {
        let fs = MockFileSystem::new();
        fs.add_file("./assets/less/app.less", "a");
        fs.add_file("./assets/less/vars.less", "b");
        fs.add_file("./assets/js/app.js", "c");

        let profiles = build_task_watch_profiles(
            Path::new("."),
            &[spec("_app_css", &["assets/**/*.less", "assets/less/app.less"])],
        )
        .unwrap();
        let files = collect_matching_files(&fs, &profiles[0]).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("assets/less/app.less"),
                PathBuf::from("assets/less/vars.less"),
            ]
        );
    }
}
