//! Invocation of the external plug control surface (the `kasa` CLI).
//!
//! The executor runs exactly one process per call and reports what happened:
//! exit status plus both output streams. It never interprets stdout; deciding
//! whether a plug ended up in the right state is the orchestrator's job.
//!
//! # Invocations
//! - set:   `kasa --host <address> --plug on|off`
//! - query: `kasa --host <address> --plug state`
//!
//! Arguments are passed as a vector, never through a shell, so sensor and
//! address values from the config cannot inject commands.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::Config;
use crate::types::{ActuatorAddress, DesiredState};

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Switch the plug to the given state.
    Set(DesiredState),
    /// Ask the plug to report its current state as text.
    QueryState,
}

impl Operation {
    /// Final `--plug` argument for this operation.
    pub fn plug_arg(self) -> &'static str {
        match self {
            Operation::Set(state) => state.as_str(),
            Operation::QueryState => "state",
        }
    }
}

// ---------------------------------------------------------------------------
// CommandResult
// ---------------------------------------------------------------------------

/// Everything captured from one control-surface invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    pub exit_succeeded: bool,
    /// Why the process did not exit cleanly: exit status, spawn error, or timeout.
    pub exit_error: Option<String>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_succeeded: true,
            exit_error: None,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_error: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_succeeded: false,
            exit_error: Some(exit_error.into()),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Non-zero exit or any stderr output. Stderr alone is disqualifying
    /// even when the process exited 0.
    pub fn is_failure(&self) -> bool {
        !self.exit_succeeded || !self.stderr.is_empty()
    }

    /// Human-readable summary of the failure for logs and alerts.
    /// The stderr clause is omitted when nothing was written to stderr.
    pub fn failure_detail(&self) -> String {
        let stderr = self.stderr.trim_end();
        match (&self.exit_error, stderr.is_empty()) {
            (Some(err), true) => format!("error {err}"),
            (Some(err), false) => format!("error {err} and stderr {stderr}"),
            (None, _) => format!("stderr {stderr}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ControlSurface
// ---------------------------------------------------------------------------

/// Capability to drive a plug. Implemented by [`KasaCli`] in production and
/// by in-memory fakes in tests.
#[async_trait]
pub trait ControlSurface: Send + Sync {
    async fn execute(&self, address: &ActuatorAddress, op: Operation) -> CommandResult;
}

// ---------------------------------------------------------------------------
// KasaCli
// ---------------------------------------------------------------------------

/// Runs the `kasa` binary as a child process, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct KasaCli {
    binary: PathBuf,
    timeout: Duration,
}

impl KasaCli {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.kasa_binary(), config.command_timeout())
    }

    fn build_command(&self, address: &ActuatorAddress, op: Operation) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["--host", address.as_str(), "--plug", op.plug_arg()]);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ControlSurface for KasaCli {
    async fn execute(&self, address: &ActuatorAddress, op: Operation) -> CommandResult {
        let child = match self.build_command(address, op).spawn() {
            Ok(c) => c,
            Err(e) => {
                return CommandResult::failure(
                    format!("failed to spawn '{}': {e}", self.binary.display()),
                    "",
                );
            }
        };

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return CommandResult::failure(format!("wait failed: {e}"), ""),
            Err(_elapsed) => {
                tracing::warn!(
                    address = %address,
                    operation = op.plug_arg(),
                    "kasa did not finish within {:?}",
                    self.timeout
                );
                return CommandResult::failure(
                    format!("timed out after {}s", self.timeout.as_secs_f64()),
                    "",
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_error = if output.status.success() {
            None
        } else {
            Some(output.status.to_string())
        };

        CommandResult {
            exit_succeeded: output.status.success(),
            exit_error,
            stdout,
            stderr,
        }
    }
}
