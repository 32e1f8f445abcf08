// src/watch/hash.rs

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;
use blake3::Hasher;
use tracing::debug;

use crate::engine::TaskName;
use crate::fs::FileSystem;

/// Compute the hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    feed(fs, path, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Compute a deterministic hash over the contents of the given files.
///
/// Order of `paths` does not matter; they are sorted before hashing. Paths
/// that are not files are skipped.
pub fn compute_hash_for_paths<I, P>(fs: &dyn FileSystem, paths: I) -> Result<String>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut hasher = Hasher::new();

    let mut paths_vec: Vec<PathBuf> = paths
        .into_iter()
        .map(|p| p.as_ref().to_path_buf())
        .collect();
    paths_vec.sort();

    for path in paths_vec {
        if fs.is_file(&path) {
            // Path bytes are part of the hash.
            hasher.update(path.to_string_lossy().as_bytes());
            feed(fs, &path, &mut hasher)?;
        }
    }

    let hash = hasher.finalize().to_hex().to_string();
    debug!(hash = %hash, "computed aggregate hash");
    Ok(hash)
}

fn feed(fs: &dyn FileSystem, path: &Path, hasher: &mut Hasher) -> Result<()> {
    let mut reader = fs.open_read(path)?;
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(())
}

/// Last seen content hash per task, kept for the lifetime of the watcher.
#[derive(Debug, Default)]
pub struct MemoryHashStore {
    hashes: HashMap<TaskName, String>,
}

impl MemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hash` for `task`; returns true if it differs from the last one.
    ///
    /// The first hash recorded for a task counts as a change.
    pub fn update(&mut self, task: &str, hash: String) -> bool {
        match self.hashes.get(task) {
            Some(previous) if *previous == hash => false,
            _ => {
                self.hashes.insert(task.to_string(), hash);
                true
            }
        }
    }

    pub fn get(&self, task: &str) -> Option<&str> {
        self.hashes.get(task).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn file_hash_matches_blake3() {
        let fs = MockFileSystem::new();
        fs.add_file("test.txt", b"hello world".to_vec());

        let hash = compute_file_hash(&fs, Path::new("test.txt")).unwrap();
        assert_eq!(
            hash,
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn aggregate_hash_is_order_insensitive_and_tracks_content() {
        let fs = MockFileSystem::new();
        fs.add_file("a.css", "a");
        fs.add_file("b.css", "b");

        let h1 = compute_hash_for_paths(&fs, ["a.css", "b.css"]).unwrap();
        let h2 = compute_hash_for_paths(&fs, ["b.css", "a.css"]).unwrap();
        assert_eq!(h1, h2);

        fs.add_file("a.css", "A");
        let h3 = compute_hash_for_paths(&fs, ["a.css", "b.css"]).unwrap();
        assert_ne!(h1, h3);
    }

    #[test]
    fn store_reports_changes_only() {
        let mut store = MemoryHashStore::new();
        assert!(store.update("_app_css", "h1".into()));
        assert!(!store.update("_app_css", "h1".into()));
        assert!(store.update("_app_css", "h2".into()));
        assert_eq!(store.get("_app_css"), Some("h2"));
    }
}
