// src/tasks/callback.rs

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::Result;
use crate::exec::run_shell;
use crate::runner::{TaskRunner, WatchSpec};
use crate::tasks::{TaskContext, TaskDescriptor, TaskFuture, TaskKind};
use crate::watch::validate_patterns;

/// Body of a callback task. It is called with the task's identifier.
pub type TaskHandler = Arc<dyn Fn(&str) -> TaskFuture<'static> + Send + Sync>;

/// Wrap an async closure that does not need the task name as a [`TaskHandler`].
pub fn handler_fn<F, Fut>(f: F) -> TaskHandler
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |_task: &str| -> TaskFuture<'static> { Box::pin(f()) })
}

/// Handler running `cmd` through the shell in `cwd`.
pub fn shell_handler(cmd: impl Into<String>, cwd: impl Into<PathBuf>) -> TaskHandler {
    let cmd = cmd.into();
    let cwd = cwd.into();
    Arc::new(move |task: &str| -> TaskFuture<'static> {
        let task = task.to_string();
        let cmd = cmd.clone();
        let cwd = cwd.clone();
        Box::pin(async move {
            run_shell(&task, &cmd, cwd).await?;
            Ok(())
        })
    })
}

/// Ad-hoc task wrapping a handler, with optional watch patterns.
pub struct CallbackTask {
    descriptor: TaskDescriptor,
    handler: TaskHandler,
    watch_patterns: Option<Vec<String>>,
    use_hash: bool,
}

impl fmt::Debug for CallbackTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackTask")
            .field("name", &self.descriptor.identifier)
            .field("watch_patterns", &self.watch_patterns)
            .finish_non_exhaustive()
    }
}

impl CallbackTask {
    pub fn new(
        descriptor: TaskDescriptor,
        handler: TaskHandler,
        watch_patterns: Option<Vec<String>>,
    ) -> Self {
        Self {
            descriptor,
            handler,
            watch_patterns,
            use_hash: false,
        }
    }
}

impl TaskKind for CallbackTask {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn init(&mut self, ctx: &TaskContext) -> Result<()> {
        if let Some(patterns) = &self.watch_patterns {
            validate_patterns(patterns)?;
        }
        self.use_hash = ctx.use_hash;
        Ok(())
    }

    fn run(&self) -> TaskFuture<'_> {
        (self.handler)(&self.descriptor.identifier)
    }

    /// Callbacks only watch when patterns were given.
    fn watch(&self, runner: &mut dyn TaskRunner) {
        let Some(patterns) = self.watch_patterns.as_ref().filter(|p| !p.is_empty()) else {
            return;
        };
        runner.register_watch(WatchSpec {
            task: self.descriptor.identifier.clone(),
            patterns: patterns.clone(),
            use_hash: self.use_hash,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::paths::DestinationSpec;
    use crate::tasks::Kind;

    fn descriptor(name: &str) -> TaskDescriptor {
        TaskDescriptor {
            identifier: name.to_string(),
            source_files: vec![],
            destination: DestinationSpec::default(),
            config: toml::Table::new(),
            kind: Kind::Callback,
        }
    }

    fn ctx() -> TaskContext {
        TaskContext {
            fs: Arc::new(MockFileSystem::new()),
            cwd: PathBuf::from("."),
            compress: false,
            use_hash: false,
        }
    }

    #[tokio::test]
    async fn handler_receives_task_identifier() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: TaskHandler = Arc::new(move |task: &str| -> TaskFuture<'static> {
            sink.lock().unwrap().push(task.to_string());
            Box::pin(async { Ok(()) })
        });

        let mut task = CallbackTask::new(descriptor("_task2"), handler, None);
        task.init(&ctx()).unwrap();
        task.run().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["_task2"]);
    }

    #[test]
    fn init_rejects_malformed_watch_patterns() {
        let handler = handler_fn(|| async { Ok(()) });
        let mut task = CallbackTask::new(
            descriptor("_task"),
            handler,
            Some(vec!["src/*.rs".into(), "x/[bad".into()]),
        );
        assert!(matches!(
            task.init(&ctx()),
            Err(crate::errors::AssetdagError::InvalidPattern { .. })
        ));
    }
}
