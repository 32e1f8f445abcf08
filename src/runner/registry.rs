// src/runner/registry.rs

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::engine::TaskName;
use crate::errors::{AssetdagError, Result};
use crate::runner::{TaskRunner, WatchSpec};
use crate::tasks::TaskKind;

/// Outcome of one [`Runner::run`] call, in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub succeeded: Vec<TaskName>,
    pub failed: Vec<(TaskName, String)>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// `Err` carrying the first failure, if any.
    pub fn into_result(self) -> Result<()> {
        match self.failed.into_iter().next() {
            None => Ok(()),
            Some((task, reason)) => Err(AssetdagError::TaskFailed { task, reason }),
        }
    }
}

/// In-process task registry and executor.
#[derive(Debug, Default)]
pub struct Runner {
    tasks: HashMap<TaskName, Arc<dyn TaskKind>>,
    order: Vec<TaskName>,
    aggregates: HashMap<TaskName, Vec<TaskName>>,
    watches: Vec<WatchSpec>,
}

impl TaskRunner for Runner {
    fn register_task(&mut self, name: &str, body: Arc<dyn TaskKind>) {
        if self.tasks.insert(name.to_string(), body).is_none() {
            self.order.push(name.to_string());
        }
        debug!(task = %name, "task registered");
    }

    fn register_aggregate(&mut self, name: &str, members: Vec<TaskName>) {
        debug!(aggregate = %name, members = members.len(), "aggregate registered");
        self.aggregates.insert(name.to_string(), members);
    }

    fn register_watch(&mut self, spec: WatchSpec) {
        debug!(task = %spec.task, patterns = ?spec.patterns, "watch registered");
        self.watches.push(spec);
    }
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered task names in registration order.
    pub fn task_names(&self) -> &[TaskName] {
        &self.order
    }

    pub fn task(&self, name: &str) -> Option<&Arc<dyn TaskKind>> {
        self.tasks.get(name)
    }

    pub fn aggregate(&self, name: &str) -> Option<&[TaskName]> {
        self.aggregates.get(name).map(Vec::as_slice)
    }

    pub fn watches(&self) -> &[WatchSpec] {
        &self.watches
    }

    /// Handles to every registered task body, keyed by name.
    pub fn bodies(&self) -> HashMap<TaskName, Arc<dyn TaskKind>> {
        self.tasks
            .iter()
            .map(|(name, body)| (name.clone(), Arc::clone(body)))
            .collect()
    }

    /// Flatten `names` into concrete task names.
    ///
    /// Aggregates expand to their members recursively; each task appears once,
    /// at its first position. Unknown names are an error.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<TaskName>> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut visiting = HashSet::new();
        for name in names {
            self.resolve_into(name.as_ref(), &mut out, &mut seen, &mut visiting)?;
        }
        Ok(out)
    }

    fn resolve_into(
        &self,
        name: &str,
        out: &mut Vec<TaskName>,
        seen: &mut HashSet<TaskName>,
        visiting: &mut HashSet<TaskName>,
    ) -> Result<()> {
        if self.tasks.contains_key(name) {
            if seen.insert(name.to_string()) {
                out.push(name.to_string());
            }
            return Ok(());
        }

        let Some(members) = self.aggregates.get(name) else {
            return Err(AssetdagError::TaskNotFound(name.to_string()));
        };

        // An aggregate listing itself (directly or not) contributes nothing new.
        if !visiting.insert(name.to_string()) {
            return Ok(());
        }
        for member in members {
            self.resolve_into(member, out, seen, visiting)?;
        }
        visiting.remove(name);
        Ok(())
    }

    /// Run the named tasks/aggregates once, concurrently.
    pub async fn run<S: AsRef<str>>(&self, names: &[S]) -> Result<RunReport> {
        let resolved = self.resolve(names)?;
        info!(tasks = ?resolved, "running tasks");

        let mut set = JoinSet::new();
        for name in &resolved {
            let body = Arc::clone(&self.tasks[name]);
            let name = name.clone();
            set.spawn(async move {
                let result = body.run().await;
                (name, result)
            });
        }

        let mut outcomes: HashMap<TaskName, std::result::Result<(), String>> = HashMap::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    outcomes.insert(name, Ok(()));
                }
                Ok((name, Err(err))) => {
                    error!(task = %name, error = %err, "task failed");
                    outcomes.insert(name, Err(err.to_string()));
                }
                Err(join_err) => {
                    error!(error = %join_err, "task panicked or was cancelled");
                }
            }
        }

        let mut report = RunReport::default();
        for name in resolved {
            match outcomes.remove(&name) {
                Some(Ok(())) => report.succeeded.push(name),
                Some(Err(reason)) => report.failed.push((name, reason)),
                None => report.failed.push((name, "task panicked".to_string())),
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::DestinationSpec;
    use crate::tasks::{handler_fn, CallbackTask, Kind, TaskDescriptor};

    fn callback(name: &str, fail: bool) -> Arc<dyn TaskKind> {
        let descriptor = TaskDescriptor {
            identifier: name.to_string(),
            source_files: vec![],
            destination: DestinationSpec::default(),
            config: toml::Table::new(),
            kind: Kind::Callback,
        };
        let handler = handler_fn(move || async move {
            if fail {
                Err(AssetdagError::ConfigError("boom".into()))
            } else {
                Ok(())
            }
        });
        Arc::new(CallbackTask::new(descriptor, handler, None))
    }

    fn runner() -> Runner {
        let mut r = Runner::new();
        r.register_task("_a", callback("_a", false));
        r.register_task("_b", callback("_b", true));
        r.register_task("_c", callback("_c", false));
        r.register_aggregate("default", vec!["_a".into(), "_b".into(), "_c".into()]);
        r.register_aggregate("outer", vec!["_c".into(), "default".into()]);
        r
    }

    #[test]
    fn resolve_flattens_aggregates_in_order() {
        let r = runner();
        assert_eq!(r.resolve(&["outer"]).unwrap(), vec!["_c", "_a", "_b"]);
        assert_eq!(r.resolve(&["_b", "default"]).unwrap(), vec!["_b", "_a", "_c"]);
    }

    #[test]
    fn resolve_unknown_name() {
        let r = runner();
        assert!(matches!(
            r.resolve(&["nope"]),
            Err(AssetdagError::TaskNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn self_referencing_aggregate_terminates() {
        let mut r = runner();
        r.register_aggregate("loop", vec!["_a".into(), "loop".into()]);
        assert_eq!(r.resolve(&["loop"]).unwrap(), vec!["_a"]);
    }

    #[test]
    fn re_registering_keeps_order() {
        let mut r = runner();
        r.register_task("_a", callback("_a", true));
        assert_eq!(r.task_names(), ["_a", "_b", "_c"]);
    }

    #[tokio::test]
    async fn run_reports_failures_in_order() {
        let r = runner();
        let report = r.run(&["default"]).await.unwrap();
        assert_eq!(report.succeeded, vec!["_a", "_c"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "_b");
        assert!(!report.is_success());
        assert!(matches!(
            report.into_result(),
            Err(AssetdagError::TaskFailed { task, .. }) if task == "_b"
        ));
    }
}
