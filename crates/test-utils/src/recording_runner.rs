use std::collections::HashMap;
use std::sync::Arc;

use assetdag::engine::TaskName;
use assetdag::runner::{TaskRunner, WatchSpec};
use assetdag::tasks::TaskKind;

/// A `TaskRunner` that only records what was registered:
/// - task names in registration order, plus their bodies
/// - the latest member list of every aggregate and how often it was set
/// - every watch spec
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub tasks: Vec<TaskName>,
    pub bodies: HashMap<TaskName, Arc<dyn TaskKind>>,
    pub aggregates: HashMap<TaskName, Vec<TaskName>>,
    pub aggregate_registrations: usize,
    pub watches: Vec<WatchSpec>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aggregate(&self, name: &str) -> Option<&[TaskName]> {
        self.aggregates.get(name).map(Vec::as_slice)
    }

    pub fn body(&self, name: &str) -> Option<&Arc<dyn TaskKind>> {
        self.bodies.get(name)
    }

    pub fn watches_for(&self, task: &str) -> Vec<&WatchSpec> {
        self.watches.iter().filter(|w| w.task == task).collect()
    }
}

impl TaskRunner for RecordingRunner {
    fn register_task(&mut self, name: &str, body: Arc<dyn TaskKind>) {
        self.tasks.push(name.to_string());
        self.bodies.insert(name.to_string(), body);
    }

    fn register_aggregate(&mut self, name: &str, members: Vec<TaskName>) {
        self.aggregate_registrations += 1;
        self.aggregates.insert(name.to_string(), members);
    }

    fn register_watch(&mut self, spec: WatchSpec) {
        self.watches.push(spec);
    }
}
