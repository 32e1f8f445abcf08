// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `assetdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetdag",
    version,
    about = "Declare and run asset build tasks: copy files, bundle styles and scripts.",
    long_about = None
)]
pub struct CliArgs {
    /// Tasks or aggregates to run. Defaults to `default`.
    ///
    /// Naming `production` also switches production mode on.
    #[arg(value_name = "TASKS")]
    pub tasks: Vec<String>,

    /// Production mode: compress, don't watch, exit non-zero on any failure.
    #[arg(long)]
    pub production: bool,

    /// Path to the manifest (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Directory source patterns and destinations are relative to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Declare everything and print the resulting tasks, but run nothing.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Requested task names, `default` when none were given.
    pub fn targets(&self) -> Vec<String> {
        if self.tasks.is_empty() {
            vec![crate::orchestrator::DEFAULT_AGGREGATE.to_string()]
        } else {
            self.tasks.clone()
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["assetdag"]).unwrap();
        assert!(!args.production);
        assert_eq!(args.config, default_config_path());
        assert_eq!(args.config, PathBuf::from("Assetfile.toml"));
        assert_eq!(args.root, PathBuf::from("."));
        assert_eq!(args.targets(), vec!["default"]);
    }

    #[test]
    fn positional_tasks_and_flags() {
        let args = CliArgs::try_parse_from([
            "assetdag",
            "production",
            "--config",
            "site/Assetfile.toml",
            "--dry-run",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.targets(), vec!["production"]);
        assert!(args.dry_run);
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
