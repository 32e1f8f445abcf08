// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod mode;
pub mod names;
pub mod orchestrator;
pub mod paths;
pub mod runner;
pub mod tasks;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::engine::{Runtime, RuntimeEvent, RuntimeOptions};
use crate::fs::{FileSystem, RealFileSystem};
use crate::mode::ModeResolver;
use crate::runner::{RunReport, Runner};
use crate::watch::{build_task_watch_profiles, spawn_watcher};

pub use crate::errors::AssetdagError;
pub use crate::orchestrator::Orchestrator;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading and mode detection
/// - declaration of every step through the orchestrator
/// - one run of the requested tasks
/// - (in watch mode) the file watcher, Ctrl-C handling and the watch runtime
pub async fn run(args: CliArgs) -> Result<()> {
    let mode = ModeResolver::from_invocation(args.production, &args.tasks);
    let manifest = load_and_validate(&args.config)?;
    info!(
        config = ?args.config,
        production = mode.is_production(),
        steps = manifest.steps().len(),
        "manifest loaded"
    );

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let orchestrator = Orchestrator::from_manifest(
        Runner::new(),
        Arc::clone(&fs),
        &args.root,
        mode,
        &manifest,
    )?;

    if args.dry_run {
        print_dry_run(&orchestrator);
        return Ok(());
    }

    let watch = orchestrator.is_watch();
    let runner = orchestrator.into_runner();

    let targets = args.targets();
    let report = runner.run(&targets).await?;
    report_failures(&report, mode)?;

    if !watch {
        return Ok(());
    }
    if runner.watches().is_empty() {
        info!("no watch patterns registered, exiting");
        return Ok(());
    }

    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("resolving project root {:?}", args.root))?;
    let profiles = build_task_watch_profiles(&root, runner.watches())?;
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let _watcher_handle = spawn_watcher(root, profiles, fs, rt_tx.clone())?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let options = RuntimeOptions {
        exit_when_idle: false,
        fail_fast: mode.is_production(),
    };
    let runtime = Runtime::new(runner.bodies(), options, rt_rx, rt_tx);
    runtime.run().await?;
    Ok(())
}

/// In production any failure ends the run; otherwise failures are only logged.
fn report_failures(report: &RunReport, mode: ModeResolver) -> Result<()> {
    if report.is_success() {
        debug!(succeeded = report.succeeded.len(), "all tasks succeeded");
        return Ok(());
    }
    if mode.is_production() {
        report.clone().into_result()?;
    }
    for (task, reason) in &report.failed {
        error!(task = %task, "task failed: {reason}");
    }
    warn!(
        failed = report.failed.len(),
        "some tasks failed, continuing in development mode"
    );
    Ok(())
}

/// Print declared tasks, aggregates and watch patterns.
fn print_dry_run(orchestrator: &Orchestrator) {
    let runner = orchestrator.runner();
    println!("assetdag dry-run");
    println!("  production = {}", orchestrator.is_production());
    println!("  watch = {}", orchestrator.is_watch());
    println!("  compress = {}", orchestrator.is_compress());
    println!();

    println!("tasks ({}):", orchestrator.tasks().len());
    for name in orchestrator.tasks() {
        let Some(task) = runner.task(name) else {
            continue;
        };
        let descriptor = task.descriptor();
        println!("  - {name} ({})", descriptor.kind);
        if !descriptor.source_files.is_empty() {
            println!("      src: {:?}", descriptor.source_files);
        }
        if !descriptor.destination.directory.is_empty() {
            println!("      dest: {}", descriptor.destination.output_path());
        }
    }

    for aggregate in [
        orchestrator::DEFAULT_AGGREGATE,
        orchestrator::PRODUCTION_AGGREGATE,
    ] {
        if let Some(members) = runner.aggregate(aggregate) {
            println!("{aggregate}: {members:?}");
        }
    }

    for spec in runner.watches() {
        println!("watch {}: {:?}", spec.task, spec.patterns);
    }

    debug!("dry-run complete (no execution)");
}
