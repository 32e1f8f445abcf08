// src/exec/command.rs

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Build a shell command appropriate for the platform.
fn shell(cmd: &str, cwd: &Path) -> Command {
    let mut c = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };
    c.current_dir(cwd).kill_on_drop(true);
    c
}

/// Run `cmd` through the shell in `cwd`, streaming its output to the log.
///
/// A non-zero exit status is an error carrying the exit code.
pub async fn run_shell(task: &str, cmd: &str, cwd: impl Into<PathBuf>) -> Result<()> {
    let cwd = cwd.into();
    info!(task = %task, cmd = %cmd, "starting command");

    let mut child = shell(cmd, &cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning process for task '{task}'"))?;

    if let Some(stdout) = child.stdout.take() {
        let task_name = task.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(task = %task_name, "{}", line);
            }
        });
    }

    // Always consume stderr so buffers don't fill.
    if let Some(stderr) = child.stderr.take() {
        let task_name = task.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{task}'"))?;

    let code = status.code().unwrap_or(-1);
    info!(task = %task, exit_code = code, success = status.success(), "command exited");

    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("command `{cmd}` exited with code {code}"))
    }
}

/// Feed `input` to `cmd` on stdin and return its stdout.
///
/// Used for external compilers configured as stdin -> stdout filters.
pub async fn pipe_through(cmd: &str, input: &str, cwd: &Path) -> Result<String> {
    debug!(cmd = %cmd, bytes = input.len(), "piping through filter");

    let mut child = shell(cmd, cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning filter `{cmd}`"))?;

    if let Some(mut stdin) = child.stdin.take() {
        let input = input.to_owned();
        // stdin is written concurrently with reading stdout.
        tokio::spawn(async move {
            let _ = stdin.write_all(input.as_bytes()).await;
        });
    }

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for filter `{cmd}`"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "filter `{cmd}` exited with code {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        ));
    }

    String::from_utf8(output.stdout).with_context(|| format!("filter `{cmd}` wrote invalid UTF-8"))
}
