// src/tasks/files.rs

use std::path::Path;

use toml::{Table, Value};
use tracing::{debug, info, warn};

use crate::errors::{AssetdagError, Result};
use crate::runner::TaskRunner;
use crate::tasks::{
    check_watch_config, initialised, source_watch_spec, TaskContext, TaskDescriptor, TaskFuture,
    TaskKind,
};

/// Built-in `[config.files]` defaults.
pub fn defaults() -> Table {
    let mut t = Table::new();
    t.insert("overwrite".into(), Value::Boolean(true));
    t
}

/// Plain file copy.
///
/// - Directory destination (`public/img/`): every source is copied into the
///   directory under its own file name.
/// - File destination (`public/robots.txt`): sources are concatenated into
///   that file, so a single source is a plain copy.
///
/// With `overwrite = false`, existing outputs are left alone.
#[derive(Debug)]
pub struct FilesTask {
    descriptor: TaskDescriptor,
    ctx: Option<TaskContext>,
    overwrite: bool,
}

impl FilesTask {
    pub fn new(descriptor: TaskDescriptor) -> Self {
        Self {
            descriptor,
            ctx: None,
            overwrite: true,
        }
    }

    fn copy_into_directory(&self, ctx: &TaskContext) -> Result<usize> {
        let dir = ctx.path(&self.descriptor.destination.directory);
        let mut copied = 0;

        for src in &self.descriptor.source_files {
            let src_path = ctx.path(src);
            if !ctx.fs.is_file(&src_path) {
                debug!(task = %self.name(), src = %src, "skipping non-file source");
                continue;
            }
            let Some(file_name) = Path::new(src).file_name() else {
                continue;
            };
            let target = dir.join(file_name);
            if !self.overwrite && ctx.fs.exists(&target) {
                debug!(task = %self.name(), target = ?target, "target exists, not overwriting");
                continue;
            }
            let bytes = ctx.fs.read(&src_path)?;
            ctx.fs.write(&target, &bytes)?;
            copied += 1;
        }

        Ok(copied)
    }

    fn concatenate_into_file(&self, ctx: &TaskContext) -> Result<usize> {
        let target = ctx.path(&self.descriptor.destination.output_path());
        if !self.overwrite && ctx.fs.exists(&target) {
            debug!(task = %self.name(), target = ?target, "target exists, not overwriting");
            return Ok(0);
        }

        let mut out = Vec::new();
        let mut copied = 0;
        for src in &self.descriptor.source_files {
            let src_path = ctx.path(src);
            if ctx.fs.is_file(&src_path) {
                out.extend(ctx.fs.read(&src_path)?);
                copied += 1;
            }
        }
        ctx.fs.write(&target, &out)?;
        Ok(copied)
    }
}

impl TaskKind for FilesTask {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn init(&mut self, ctx: &TaskContext) -> Result<()> {
        match self.descriptor.config.get("overwrite") {
            None => {}
            Some(Value::Boolean(b)) => self.overwrite = *b,
            Some(other) => {
                return Err(AssetdagError::ConfigError(format!(
                    "task '{}': `overwrite` must be true or false (got {other})",
                    self.descriptor.identifier
                )));
            }
        }
        check_watch_config(&self.descriptor)?;
        if self.descriptor.source_files.is_empty() {
            warn!(task = %self.descriptor.identifier, "files task has no matching sources");
        }
        self.ctx = Some(ctx.clone());
        Ok(())
    }

    fn run(&self) -> TaskFuture<'_> {
        Box::pin(async move {
            let ctx = initialised(&self.ctx, self.name())?;
            let copied = if self.descriptor.destination.is_file_target() {
                self.concatenate_into_file(ctx)?
            } else {
                self.copy_into_directory(ctx)?
            };
            info!(
                task = %self.name(),
                copied,
                dest = %self.descriptor.destination.output_path(),
                "files copied"
            );
            Ok(())
        })
    }

    fn watch(&self, runner: &mut dyn TaskRunner) {
        let use_hash = self.ctx.as_ref().is_some_and(|c| c.use_hash);
        runner.register_watch(source_watch_spec(&self.descriptor, use_hash));
    }
}
