// src/logging.rs

//! Log output for `assetdag`.
//!
//! The filter comes from `--log-level` when given. Otherwise `ASSETDAG_LOG`
//! is read as a full `EnvFilter` directive list, so
//! `ASSETDAG_LOG=warn,assetdag::watch=trace` narrows output to one module.
//! Without either, everything at `info` and above is shown.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

const ENV_VAR: &str = "ASSETDAG_LOG";

/// Install the global subscriber, writing to stderr so `--dry-run` output on
/// stdout stays clean.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(ENV_VAR).ok().as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    let directives = match (cli_level, env.map(str::trim)) {
        (Some(level), _) => directive(level),
        (None, Some(env)) if !env.is_empty() => env,
        (None, _) => "info",
    };
    EnvFilter::try_new(directives)
        .map_err(|e| anyhow!("invalid log filter {directives:?}: {e}"))
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
