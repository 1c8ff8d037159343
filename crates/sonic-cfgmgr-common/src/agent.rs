//! Remote agent abstraction.
//!
//! Every device interaction of a reconciliation (command execution and
//! file transfer) goes through [`RemoteAgent`]. The agent is injected
//! into each workflow, so tests swap in an in-memory implementation and
//! production uses [`LocalAgent`] running on the switch.
//!
//! Timeouts and retries belong to the agent implementation; callers
//! block until each primitive returns.

use std::io::ErrorKind;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::{CfgMgrError, CfgMgrResult};
use crate::shell::{self, ExecResult};

/// Primitives needed to stage, validate and apply configuration on a device.
#[async_trait]
pub trait RemoteAgent: Send + Sync {
    /// Runs a shell command and returns its output and exit code.
    async fn run(&self, command: &str) -> CfgMgrResult<ExecResult>;

    /// Writes `content` to `path`, replacing any existing file.
    async fn write_file(&self, path: &str, content: &str) -> CfgMgrResult<()>;

    /// Reads the whole file at `path`.
    async fn read_file(&self, path: &str) -> CfgMgrResult<String>;

    /// Removes the file at `path`. Removing a missing file is not an error.
    async fn remove_file(&self, path: &str) -> CfgMgrResult<()>;

    /// Checks whether `path` exists.
    async fn file_exists(&self, path: &str) -> CfgMgrResult<bool>;

    /// Runs a command and turns a non-zero exit into an error.
    ///
    /// Returns stdout on success.
    async fn run_or_throw(&self, command: &str) -> CfgMgrResult<String> {
        let result = self.run(command).await?;
        if result.success() {
            Ok(result.stdout)
        } else {
            Err(CfgMgrError::ShellCommandFailed {
                command: command.to_string(),
                exit_code: result.exit_code,
                output: result.combined_output(),
            })
        }
    }
}

/// Agent executing directly on the switch it manages.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAgent;

impl LocalAgent {
    /// Creates a new local agent.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteAgent for LocalAgent {
    async fn run(&self, command: &str) -> CfgMgrResult<ExecResult> {
        shell::exec(command).await
    }

    #[instrument(skip(self, content), fields(bytes = content.len()))]
    async fn write_file(&self, path: &str, content: &str) -> CfgMgrResult<()> {
        tokio::fs::write(path, content)
            .await
            .map_err(|e| CfgMgrError::io(path, e))?;
        debug!("Wrote {}", path);
        Ok(())
    }

    async fn read_file(&self, path: &str) -> CfgMgrResult<String> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(CfgMgrError::file_not_found(path)),
            Err(e) => Err(CfgMgrError::io(path, e)),
        }
    }

    async fn remove_file(&self, path: &str) -> CfgMgrResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed {}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CfgMgrError::io(path, e)),
        }
    }

    async fn file_exists(&self, path: &str) -> CfgMgrResult<bool> {
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| CfgMgrError::io(path, e))
    }
}
