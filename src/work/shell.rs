// src/work/shell.rs

//! Shell-command work unit.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::context::RunContext;
use crate::errors::{Result, RundagError};
use crate::work::unit::{UnitMeta, WorkUnit};

/// A work unit that runs a command through the platform shell.
///
/// This is what the config layer attaches to targets. The synchronous path
/// runs the command with `std::process` and captures its output; the async
/// path pipes stdout/stderr and streams each line to the debug log while
/// the process runs.
pub struct ShellTask {
    cmd: String,
    meta: UnitMeta,
}

impl ShellTask {
    /// New shell task; the command string doubles as the display name
    /// until overridden with [`named`](ShellTask::named).
    pub fn new(cmd: impl Into<String>) -> Self {
        let cmd = cmd.into();
        Self {
            meta: UnitMeta::described(cmd.clone()),
            cmd,
        }
    }

    /// Override the display name used in log lines.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.meta.set_description(name);
        self
    }

    /// Mark the command as safe to run during a dry run.
    pub fn dry_run_safe(mut self) -> Self {
        self.meta.set_dry_run_safe(true);
        self
    }

    /// Log the elapsed duration after each invocation.
    pub fn log_duration(mut self) -> Self {
        self.meta.set_log_duration(true);
        self
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    // Build a shell command appropriate for the platform.
    fn sync_command(&self) -> std::process::Command {
        if cfg!(windows) {
            let mut c = std::process::Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = std::process::Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        }
    }

    fn async_command(&self) -> tokio::process::Command {
        if cfg!(windows) {
            let mut c = tokio::process::Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = tokio::process::Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        }
    }

    fn status_to_result(&self, code: Option<i32>, success: bool) -> Result<()> {
        let code = code.unwrap_or(-1);
        debug!(cmd = %self.cmd, exit_code = code, success, "shell command exited");
        if success {
            Ok(())
        } else {
            Err(RundagError::task_failure(
                code,
                format!("command '{}' failed", self.cmd),
            ))
        }
    }
}

#[async_trait]
impl WorkUnit for ShellTask {
    type Output = ();

    fn meta(&self) -> &UnitMeta {
        &self.meta
    }

    fn perform(&self, _ctx: &RunContext) -> Result<()> {
        let output = self.sync_command().output()?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(cmd = %self.cmd, "stdout: {}", line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!(cmd = %self.cmd, "stderr: {}", line);
        }

        self.status_to_result(output.status.code(), output.status.success())
    }

    async fn perform_async(&self, _ctx: &RunContext) -> Result<()> {
        let mut cmd = self.async_command();
        cmd.stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn()?;

        // Consume stdout/stderr so buffers don't fill; log at debug.
        if let Some(stdout) = child.stdout.take() {
            let name = self.cmd.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(cmd = %name, "stdout: {}", line);
                }
            });
        }
        if let Some(stderr) = child.stderr.take() {
            let name = self.cmd.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(cmd = %name, "stderr: {}", line);
                }
            });
        }

        let status = child.wait().await?;
        self.status_to_result(status.code(), status.success())
    }
}
