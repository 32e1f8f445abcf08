// src/tasks/style.rs

use toml::{Table, Value};
use tracing::warn;

use crate::errors::Result;
use crate::runner::TaskRunner;
use crate::tasks::bundle::{self, BundleOptions};
use crate::tasks::{
    check_watch_config, initialised, source_watch_spec, TaskContext, TaskDescriptor, TaskFuture,
    TaskKind,
};

/// Built-in `[config.style]` defaults.
pub fn defaults() -> Table {
    let mut t = Table::new();
    t.insert("separator".into(), Value::String("\n".into()));
    t
}

/// Stylesheet bundle: sources joined into one `.css` output.
#[derive(Debug)]
pub struct StyleTask {
    descriptor: TaskDescriptor,
    ctx: Option<TaskContext>,
    options: Option<BundleOptions>,
}

impl StyleTask {
    pub fn new(descriptor: TaskDescriptor) -> Self {
        Self {
            descriptor,
            ctx: None,
            options: None,
        }
    }
}

impl TaskKind for StyleTask {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn init(&mut self, ctx: &TaskContext) -> Result<()> {
        check_watch_config(&self.descriptor)?;
        if self.descriptor.source_files.is_empty() {
            warn!(task = %self.descriptor.identifier, "style task has no matching sources");
        }
        self.options = Some(BundleOptions::from_descriptor(&self.descriptor, ctx.compress)?);
        self.ctx = Some(ctx.clone());
        Ok(())
    }

    fn run(&self) -> TaskFuture<'_> {
        Box::pin(async move {
            let ctx = initialised(&self.ctx, self.name())?;
            let Some(options) = &self.options else {
                return Err(crate::errors::AssetdagError::TaskFailed {
                    task: self.name().to_string(),
                    reason: "task was run before init".to_string(),
                });
            };
            bundle::build(ctx, &self.descriptor, options).await
        })
    }

    fn watch(&self, runner: &mut dyn TaskRunner) {
        let use_hash = self.ctx.as_ref().is_some_and(|c| c.use_hash);
        runner.register_watch(source_watch_spec(&self.descriptor, use_hash));
    }
}
