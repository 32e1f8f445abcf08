// src/watch/watcher.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::fs::FileSystem;
use crate::watch::hash::{compute_hash_for_paths, MemoryHashStore};
use crate::watch::patterns::{collect_matching_files, TaskWatchProfile};

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher that observes `root` recursively and sends
/// `RuntimeEvent::TaskTriggered` for tasks whose patterns match a changed
/// path.
///
/// Profile roots outside `root` (sources such as `../shared/*.less`) are
/// watched as well. Profiles with `use_hash` only trigger when the aggregate
/// hash of their matching files differs from the last one seen.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profiles: Vec<TaskWatchProfile>,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    let mut hashes = MemoryHashStore::new();
    for profile in profiles.iter().filter(|p| p.use_hash()) {
        match profile_hash(fs.as_ref(), profile) {
            Ok(hash) => {
                hashes.update(profile.name(), hash);
            }
            Err(err) => warn!(task = %profile.name(), "could not seed content hash: {err:#}"),
        }
    }

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("assetdag: failed to forward notify event: {err}");
                }
            }
            Err(err) => eprintln!("assetdag: file watch error: {err}"),
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    for extra in outside_roots(&root, &profiles) {
        debug!(dir = ?extra, "watching directory outside the root");
        watcher.watch(&extra, RecursiveMode::Recursive)?;
    }
    info!(root = ?root, profiles = profiles.len(), "file watcher started");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            debug!("received notify event: {:?}", event);

            let triggered = matching_tasks(&event.paths, &profiles);

            for profile in profiles.iter().filter(|p| triggered.contains(p.name())) {
                if !content_changed(fs.as_ref(), &mut hashes, profile) {
                    continue;
                }

                debug!(task = %profile.name(), "watch match -> triggering task");
                let sent = runtime_tx
                    .send(RuntimeEvent::TaskTriggered {
                        task: profile.name().to_string(),
                        reason: TriggerReason::FileWatch,
                    })
                    .await;
                if let Err(err) = sent {
                    warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
                    return;
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Names of the profiles interested in any of `paths`.
///
/// A path that matches nothing as given is retried in canonical form, so
/// symlinked temp dirs still resolve.
pub fn matching_tasks(paths: &[PathBuf], profiles: &[TaskWatchProfile]) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for path in paths {
        let before = out.len();
        collect_hits(path, profiles, &mut out);
        if out.len() == before {
            if let Ok(canon) = path.canonicalize() {
                collect_hits(&canon, profiles, &mut out);
            }
        }
    }
    out
}

fn collect_hits(path: &Path, profiles: &[TaskWatchProfile], out: &mut BTreeSet<String>) {
    for profile in profiles.iter().filter(|p| p.matches_path(path)) {
        out.insert(profile.name().to_string());
    }
}

/// Existing profile roots that the recursive watch on `root` does not cover.
pub fn outside_roots(root: &Path, profiles: &[TaskWatchProfile]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in profiles.iter().flat_map(|p| p.roots()) {
        let Ok(dir) = dir.canonicalize() else {
            debug!(dir = ?dir, "watch root does not exist yet");
            continue;
        };
        if dir.starts_with(root) || dirs.iter().any(|d| dir.starts_with(d)) {
            continue;
        }
        dirs.retain(|d| !d.starts_with(&dir));
        dirs.push(dir);
    }
    dirs
}

/// False only for a `use_hash` profile whose matched files hash the same as
/// last time. A failed hash counts as a change.
fn content_changed(
    fs: &dyn FileSystem,
    hashes: &mut MemoryHashStore,
    profile: &TaskWatchProfile,
) -> bool {
    if !profile.use_hash() {
        return true;
    }
    match profile_hash(fs, profile) {
        Ok(hash) => {
            let changed = hashes.update(profile.name(), hash);
            if !changed {
                debug!(task = %profile.name(), "content unchanged, not triggering");
            }
            changed
        }
        Err(err) => {
            warn!(task = %profile.name(), "hashing failed, triggering anyway: {err:#}");
            true
        }
    }
}

fn profile_hash(fs: &dyn FileSystem, profile: &TaskWatchProfile) -> Result<String> {
    let files = collect_matching_files(fs, profile)?;
    compute_hash_for_paths(fs, files)
}
