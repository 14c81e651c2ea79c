// src/exec/command.rs

//! Shell command execution: whole-task commands (`cmd = "..."`) and the
//! content filter used by `command` pipe stages.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::TaskpipeError;
use crate::task::{BoxFuture, TaskBody};
use crate::types::TaskName;

/// Captured result of a finished shell command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Last non-empty stderr line, for error messages.
    pub fn stderr_tail(&self) -> String {
        String::from_utf8_lossy(&self.stderr)
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

fn shell(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// Run `cmd` through the platform shell in `cwd`.
///
/// With `stdin = Some(bytes)` the bytes are fed to the child's standard
/// input; otherwise stdin is closed. Stdout and stderr are captured.
pub async fn run_shell(
    cmd: &str,
    cwd: &Path,
    env: &[(&str, String)],
    stdin: Option<Vec<u8>>,
) -> Result<CommandOutput> {
    let mut command = shell(cmd);
    command
        .current_dir(cwd)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in env {
        command.env(key, value);
    }

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning `{cmd}`"))?;

    // Feed stdin from its own task so a child that writes before it has
    // read everything cannot deadlock against us.
    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        tokio::spawn(async move {
            if let Err(err) = pipe.write_all(&input).await {
                debug!(error = %err, "child closed stdin early");
            }
        });
    }

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for `{cmd}`"))?;

    Ok(CommandOutput {
        code: output.status.code(),
        success: output.status.success(),
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// Filter `input` through `cmd` and return its stdout.
///
/// A non-zero exit status is an error carrying the last stderr line.
pub async fn filter(
    cmd: &str,
    cwd: &Path,
    env: &[(&str, String)],
    input: Vec<u8>,
) -> Result<Vec<u8>> {
    let out = run_shell(cmd, cwd, env, Some(input)).await?;
    if !out.success {
        bail!(
            "`{cmd}` exited with status {}: {}",
            display_code(out.code),
            out.stderr_tail()
        );
    }
    Ok(out.stdout)
}

fn display_code(code: Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "<signal>".to_string())
}

/// Task body that runs a shell command (`cmd = "..."` in config).
#[derive(Debug, Clone)]
pub struct CommandTask {
    name: TaskName,
    cmd: String,
    cwd: PathBuf,
}

impl CommandTask {
    pub fn new(name: impl Into<TaskName>, cmd: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
            cwd: cwd.into(),
        }
    }

    async fn execute(&self) -> crate::errors::Result<()> {
        info!(task = %self.name, cmd = %self.cmd, "running command");
        let started = Instant::now();

        let out = run_shell(&self.cmd, &self.cwd, &[], None).await?;

        for line in String::from_utf8_lossy(&out.stdout).lines() {
            info!(task = %self.name, "{line}");
        }
        for line in String::from_utf8_lossy(&out.stderr).lines() {
            debug!(task = %self.name, "stderr: {line}");
        }

        if !out.success {
            warn!(
                task = %self.name,
                exit_code = ?out.code,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "command failed"
            );
            return Err(TaskpipeError::Other(anyhow::anyhow!(
                "`{}` exited with status {}: {}",
                self.cmd,
                display_code(out.code),
                out.stderr_tail()
            )));
        }
        Ok(())
    }
}

impl TaskBody for CommandTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self) -> BoxFuture<'_, crate::errors::Result<()>> {
        Box::pin(self.execute())
    }
}
