// src/tasks/bundle.rs

//! Shared body of the style and script kinds: concatenate sources, run the
//! optional compiler filter, compress, write one output file.

use anyhow::Context;
use tracing::{debug, info};

use crate::errors::{AssetdagError, Result};
use crate::exec::pipe_through;
use crate::tasks::{TaskContext, TaskDescriptor};

/// Options read from a task's merged config at `init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    pub separator: String,
    pub banner: Option<String>,
    pub compiler: Option<String>,
    pub compress: bool,
}

impl BundleOptions {
    pub fn from_descriptor(descriptor: &TaskDescriptor, compress: bool) -> Result<Self> {
        for key in ["separator", "banner", "compiler"] {
            if let Some(value) = descriptor.config.get(key) {
                if !value.is_str() {
                    return Err(AssetdagError::ConfigError(format!(
                        "task '{}': `{key}` must be a string",
                        descriptor.identifier
                    )));
                }
            }
        }

        Ok(Self {
            separator: descriptor.config_str("separator").unwrap_or("\n").to_string(),
            banner: descriptor.config_str("banner").map(str::to_string),
            compiler: descriptor
                .config_str("compiler")
                .filter(|c| !c.trim().is_empty())
                .map(str::to_string),
            compress: descriptor.config_bool("compress").unwrap_or(compress),
        })
    }
}

/// Concatenate `descriptor.source_files` and write the result to the
/// destination file.
pub async fn build(
    ctx: &TaskContext,
    descriptor: &TaskDescriptor,
    options: &BundleOptions,
) -> Result<()> {
    let mut parts = Vec::with_capacity(descriptor.source_files.len() + 1);
    if let Some(banner) = &options.banner {
        parts.push(banner.clone());
    }
    for src in &descriptor.source_files {
        let text = ctx.fs.read_to_string(&ctx.path(src))?;
        parts.push(text);
    }
    let mut output = parts.join(&options.separator);

    if let Some(compiler) = &options.compiler {
        output = pipe_through(compiler, &output, ctx.cwd())
            .await
            .with_context(|| format!("compiling bundle for task '{}'", descriptor.identifier))?;
    }

    if options.compress {
        output = compress(&output);
    }

    let out_path = ctx.path(&descriptor.destination.output_path());
    ctx.fs.write(&out_path, output.as_bytes())?;

    info!(
        task = %descriptor.identifier,
        sources = descriptor.source_files.len(),
        bytes = output.len(),
        output = ?out_path,
        "bundle written"
    );
    Ok(())
}

/// Trim every line and drop blank ones.
pub fn compress(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    debug!(lines = lines.len(), "compressed bundle");
    lines.join("\n")
}
