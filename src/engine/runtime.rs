// src/engine/runtime.rs

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::{RuntimeEvent, RuntimeOptions, TaskName, TaskOutcome, TriggerReason};
use crate::errors::{AssetdagError, Result};
use crate::tasks::TaskKind;

/// The watch-mode runtime.
///
/// Responsibilities:
/// - Consume `RuntimeEvent`s from the watcher, task executions and Ctrl-C.
/// - Start a task when it is triggered and not already running.
/// - Remember at most one rerun per task while it runs.
pub struct Runtime {
    tasks: HashMap<TaskName, Arc<dyn TaskKind>>,
    options: RuntimeOptions,

    /// Unified event stream from all producers.
    events_rx: mpsc::Receiver<RuntimeEvent>,

    /// Handed to spawned executions so they can report completion.
    events_tx: mpsc::Sender<RuntimeEvent>,

    running: HashSet<TaskName>,
    pending: HashSet<TaskName>,
}

impl Runtime {
    pub fn new(
        tasks: HashMap<TaskName, Arc<dyn TaskKind>>,
        options: RuntimeOptions,
        events_rx: mpsc::Receiver<RuntimeEvent>,
        events_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            tasks,
            options,
            events_rx,
            events_tx,
            running: HashSet::new(),
            pending: HashSet::new(),
        }
    }

    /// Main event loop.
    pub async fn run(mut self) -> Result<()> {
        info!("assetdag watch runtime started");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "runtime received event");

            let keep_running = match event {
                RuntimeEvent::TaskTriggered { task, reason } => {
                    self.handle_trigger(task, reason);
                    true
                }
                RuntimeEvent::TaskCompleted { task, outcome } => {
                    self.handle_completion(task, outcome)?
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runtime");
                    false
                }
            };

            if !keep_running {
                break;
            }
        }

        info!("assetdag watch runtime exiting");
        Ok(())
    }

    fn handle_trigger(&mut self, task: TaskName, reason: TriggerReason) {
        if !self.tasks.contains_key(&task) {
            warn!(task = %task, "trigger for unknown task ignored");
            return;
        }

        if self.running.contains(&task) {
            debug!(task = %task, ?reason, "task running, rerun queued");
            self.pending.insert(task);
        } else {
            info!(task = %task, ?reason, "task triggered");
            self.spawn(task);
        }
    }

    fn handle_completion(&mut self, task: TaskName, outcome: TaskOutcome) -> Result<bool> {
        self.running.remove(&task);

        match outcome {
            TaskOutcome::Success => info!(task = %task, "task completed successfully"),
            TaskOutcome::Failed(reason) => {
                error!(task = %task, error = %reason, "task failed");
                if self.options.fail_fast {
                    return Err(AssetdagError::TaskFailed { task, reason });
                }
            }
        }

        if self.pending.remove(&task) {
            self.spawn(task);
        }

        if self.options.exit_when_idle && self.running.is_empty() && self.pending.is_empty() {
            info!("runtime idle and exit_when_idle=true, stopping");
            return Ok(false);
        }

        Ok(true)
    }

    fn spawn(&mut self, task: TaskName) {
        let Some(body) = self.tasks.get(&task).map(Arc::clone) else {
            return;
        };
        self.running.insert(task.clone());

        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = match body.run().await {
                Ok(()) => TaskOutcome::Success,
                Err(err) => TaskOutcome::Failed(err.to_string()),
            };
            if let Err(err) = tx.send(RuntimeEvent::TaskCompleted { task, outcome }).await {
                warn!("failed to send RuntimeEvent::TaskCompleted: {err}");
            }
        });
    }
}
