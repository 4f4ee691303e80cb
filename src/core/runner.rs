//! Process runner for the cass binary
//!
//! Every call spawns `cass <args...>` with `CASS_DATA_DIR` injected,
//! waits up to a timeout and normalizes the outcome into an
//! [`InvocationResult`]. Nothing here returns an error: spawn failures,
//! timeouts and non-zero exits are all values.

use crate::core::config::DATA_DIR_ENV;
use crate::core::types::{CommandOutput, InvocationFailure, InvocationResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runs the cass binary
#[derive(Debug, Clone)]
pub struct CassRunner {
    binary: PathBuf,
    data_dir: PathBuf,
}

impl CassRunner {
    pub fn new(binary: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Build a command for `cass <args...>`
    ///
    /// The child is killed if its handle is dropped, so a cancelled
    /// caller never leaves a process behind.
    pub fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .env(DATA_DIR_ENV, &self.data_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Execute cass and normalize its output
    pub async fn run(&self, args: &[String], timeout: Duration) -> InvocationResult {
        info!("Running: {} {}", self.binary.display(), args.join(" "));

        let mut child = match self.command(args).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to spawn {}: {}", self.binary.display(), e);
                return InvocationResult::message(e.to_string());
            }
        };

        let stdout = tokio::spawn(drain(child.stdout.take()));
        let stderr = tokio::spawn(drain(child.stderr.take()));

        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                stdout.abort();
                stderr.abort();
                return InvocationResult::message(e.to_string());
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill timed out cass process: {}", e);
                }
                stdout.abort();
                stderr.abort();
                return InvocationResult::message(format!(
                    "Command timed out after {timeout:?}"
                ));
            }
        };

        let stdout = stdout.await.unwrap_or_default();
        let stderr = stderr.await.unwrap_or_default();
        debug!(
            exit_code = ?status.code(),
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "cass exited"
        );

        normalize(status.success(), status.code(), &stdout, &stderr)
    }
}

/// Read a child pipe to the end
async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            debug!("Failed to read child pipe: {}", e);
        }
    }
    buf
}

/// Map an exit status and captured output to an [`InvocationResult`]
pub fn normalize(
    success: bool,
    exit_code: Option<i32>,
    stdout: &[u8],
    stderr: &[u8],
) -> InvocationResult {
    let stdout = String::from_utf8_lossy(stdout);

    if !success {
        return InvocationResult::Failure(InvocationFailure::Exit {
            exit_code,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
            stdout: stdout.trim().to_string(),
        });
    }

    match serde_json::from_str::<Value>(&stdout) {
        Ok(value) => InvocationResult::Success(CommandOutput::Json(value)),
        Err(_) => InvocationResult::Success(CommandOutput::Text(stdout.trim().to_string())),
    }
}
