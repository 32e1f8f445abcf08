// src/orchestrator.rs

//! The declaration façade.
//!
//! An [`Orchestrator`] owns the global settings, the name registry and the
//! mode flags. Each declaration expands its sources, resolves a destination,
//! merges config, builds the matching [`TaskKind`] and registers it with the
//! runner. Every registered task is appended to the `default` and
//! `production` aggregates.

use std::path::PathBuf;
use std::sync::Arc;

use toml::Table;
use tracing::{debug, error, info};

use crate::config::merge::merged;
use crate::config::model::{Manifest, Settings, StepConfig};
use crate::engine::TaskName;
use crate::errors::{AssetdagError, Result};
use crate::fs::FileSystem;
use crate::mode::ModeResolver;
use crate::names::NameAllocator;
use crate::paths::{DestinationSpec, PathResolver, Sources};
use crate::runner::{Runner, TaskRunner};
use crate::tasks::{
    shell_handler, CallbackTask, FilesTask, Kind, ScriptTask, StyleTask, TaskContext,
    TaskDescriptor, TaskHandler, TaskKind,
};

/// Aggregate run when no task is named.
pub const DEFAULT_AGGREGATE: &str = "default";

/// Aggregate run by `assetdag production`.
pub const PRODUCTION_AGGREGATE: &str = "production";

/// Declares tasks against one runner. Several may coexist; none share state.
pub struct Orchestrator<R: TaskRunner = Runner> {
    settings: Settings,
    names: NameAllocator,
    mode: ModeResolver,
    paths: PathResolver,
    runner: R,
    declared: Vec<TaskName>,
}

impl<R: TaskRunner> std::fmt::Debug for Orchestrator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .field("mode", &self.mode)
            .field("declared", &self.declared)
            .finish_non_exhaustive()
    }
}

impl<R: TaskRunner> Orchestrator<R> {
    pub fn new(
        runner: R,
        fs: Arc<dyn FileSystem>,
        cwd: impl Into<PathBuf>,
        mode: ModeResolver,
    ) -> Self {
        let settings = Settings::default();
        let names = NameAllocator::new(settings.name());
        let mut orchestrator = Self {
            settings,
            names,
            mode,
            paths: PathResolver::new(fs, cwd),
            runner,
            declared: Vec::new(),
        };
        orchestrator.publish_aggregates();
        orchestrator
    }

    /// Build an orchestrator and declare every step of `manifest` in order.
    pub fn from_manifest(
        runner: R,
        fs: Arc<dyn FileSystem>,
        cwd: impl Into<PathBuf>,
        mode: ModeResolver,
        manifest: &Manifest,
    ) -> Result<Self> {
        let mut orchestrator = Self::new(runner, fs, cwd, mode);
        orchestrator.config(manifest.settings().as_table())?;
        for step in manifest.steps() {
            orchestrator.declare_step(step)?;
        }
        Ok(orchestrator)
    }

    /// Deep-merge `overrides` into the global settings.
    ///
    /// Affects only declarations made afterwards.
    pub fn config(&mut self, overrides: &Table) -> Result<&mut Self> {
        self.settings.merge(overrides);
        self.names.set_default_base(self.settings.name());
        debug!(settings = ?self.settings.as_table(), "settings updated");
        Ok(self)
    }

    /// Copy or concatenate files. A `dest` ending in `/` is a directory.
    pub fn files(
        &mut self,
        src: impl Into<Sources>,
        dest: &str,
        config: Option<&Table>,
    ) -> Result<&mut Self> {
        self.declare(Kind::Files, src.into(), dest, config)
    }

    /// Bundle stylesheets into one `.css` file.
    pub fn style(
        &mut self,
        src: impl Into<Sources>,
        dest: &str,
        config: Option<&Table>,
    ) -> Result<&mut Self> {
        self.declare(Kind::Style, src.into(), dest, config)
    }

    /// Bundle scripts into one `.js` file.
    pub fn script(
        &mut self,
        src: impl Into<Sources>,
        dest: &str,
        config: Option<&Table>,
    ) -> Result<&mut Self> {
        self.declare(Kind::Script, src.into(), dest, config)
    }

    /// Register an arbitrary handler, re-run on changes to `watch` when given.
    pub fn task(&mut self, handler: TaskHandler, watch: Option<Vec<String>>) -> Result<&mut Self> {
        self.declare_callback(handler, watch, None)
    }

    /// Declare one manifest step. `task` steps run their `cmd` in the shell.
    pub fn declare_step(&mut self, step: &StepConfig) -> Result<&mut Self> {
        match step.kind {
            Kind::Callback => {
                let Some(cmd) = step.cmd.as_deref().filter(|c| !c.trim().is_empty()) else {
                    let err = AssetdagError::ConfigError("task step has no `cmd`".to_string());
                    self.fault(Kind::Callback, err)?;
                    return Ok(self);
                };
                let handler = shell_handler(cmd, self.paths.cwd());
                self.declare_callback(handler, step.watch.clone(), step.config.as_ref())
            }
            kind => {
                let src = step.src.clone().unwrap_or(Sources::Many(Vec::new()));
                let dest = step.dest.as_deref().unwrap_or("");
                self.declare(kind, src, dest, step.config.as_ref())
            }
        }
    }

    pub fn is_watch(&self) -> bool {
        self.mode.effective_watch(self.settings.watch())
    }

    pub fn is_compress(&self) -> bool {
        self.mode.effective_compress(self.settings.compress())
    }

    pub fn is_production(&self) -> bool {
        self.mode.is_production()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Identifiers of registered tasks, in declaration order.
    pub fn tasks(&self) -> &[TaskName] {
        &self.declared
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    fn declare(
        &mut self,
        kind: Kind,
        src: Sources,
        dest: &str,
        overrides: Option<&Table>,
    ) -> Result<&mut Self> {
        match self.build_file_task(kind, src, dest, overrides) {
            Ok(task) => self.register(task),
            Err(err) => self.fault(kind, err)?,
        }
        Ok(self)
    }

    fn declare_callback(
        &mut self,
        handler: TaskHandler,
        watch: Option<Vec<String>>,
        overrides: Option<&Table>,
    ) -> Result<&mut Self> {
        let descriptor = TaskDescriptor {
            identifier: self.names.allocate_task_name(&Kind::Callback.name_candidate("")),
            source_files: Vec::new(),
            destination: DestinationSpec {
                base_name: "task".to_string(),
                ..DestinationSpec::default()
            },
            config: self.merged_config(Kind::Callback, overrides),
            kind: Kind::Callback,
        };

        let mut task: Box<dyn TaskKind> = Box::new(CallbackTask::new(descriptor, handler, watch));
        match task.init(&self.context()) {
            Ok(()) => self.register(Arc::from(task)),
            Err(err) => self.fault(Kind::Callback, err)?,
        }
        Ok(self)
    }

    fn build_file_task(
        &mut self,
        kind: Kind,
        src: Sources,
        dest: &str,
        overrides: Option<&Table>,
    ) -> Result<Arc<dyn TaskKind>> {
        let source_files = self.paths.expand(&src.into_vec())?;

        let is_file_target = match kind {
            Kind::Files => !dest.ends_with('/'),
            _ => true,
        };
        let dest_root = self.settings.dest().to_string();
        let destination = self.paths.resolve_destination(
            dest,
            is_file_target,
            kind.group(),
            &dest_root,
            &mut self.names,
        );

        let config = self.merged_config(kind, overrides);
        let identifier = self
            .names
            .allocate_task_name(&kind.name_candidate(&destination.base_name));

        let descriptor = TaskDescriptor {
            identifier,
            source_files,
            destination,
            config,
            kind,
        };
        debug!(?descriptor, "declaring task");

        let mut task: Box<dyn TaskKind> = match kind {
            Kind::Files => Box::new(FilesTask::new(descriptor)),
            Kind::Style => Box::new(StyleTask::new(descriptor)),
            Kind::Script => Box::new(ScriptTask::new(descriptor)),
            Kind::Callback => {
                return Err(AssetdagError::ConfigError(
                    "callback tasks take a handler, not sources".to_string(),
                ));
            }
        };
        task.init(&self.context())?;
        Ok(Arc::from(task))
    }

    /// Built-in defaults, then `[config.<kind>]`, then the per-call table.
    fn merged_config(&self, kind: Kind, overrides: Option<&Table>) -> Table {
        let builtin = kind.builtin_defaults();
        let global = self.settings.kind_defaults(kind);
        let empty = Table::new();
        merged([&builtin, &global, overrides.unwrap_or(&empty)])
    }

    fn context(&self) -> TaskContext {
        TaskContext {
            fs: Arc::clone(self.paths.fs()),
            cwd: self.paths.cwd().to_path_buf(),
            compress: self.is_compress(),
            use_hash: self.settings.use_hash(),
        }
    }

    fn register(&mut self, task: Arc<dyn TaskKind>) {
        let name = task.name().to_string();
        self.runner.register_task(&name, Arc::clone(&task));
        if self.is_watch() {
            task.watch(&mut self.runner);
        }
        info!(task = %name, kind = %task.descriptor().kind, "task registered");

        self.declared.push(name);
        self.publish_aggregates();
    }

    fn publish_aggregates(&mut self) {
        self.runner
            .register_aggregate(DEFAULT_AGGREGATE, self.declared.clone());
        self.runner
            .register_aggregate(PRODUCTION_AGGREGATE, self.declared.clone());
    }

    /// Development: log and skip the declaration. Production: propagate.
    fn fault(&self, kind: Kind, err: AssetdagError) -> Result<()> {
        if self.mode.is_production() {
            return Err(err);
        }
        error!(kind = %kind, "declaration skipped: {err}");
        Ok(())
    }
}
