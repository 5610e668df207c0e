//! Shell command execution for pipeline stages and simulated imports

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{CommandOutput, CommandRunner};
use shared::node_debug;

const SHELL: &str = "/bin/bash";

/// Runs commands through `bash -c` inside the gateway workdir
pub struct ShellCommandRunner {
    workdir: PathBuf,
}

impl ShellCommandRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self { workdir: workdir.into() }
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, command: &str) -> OrchestratorResult<CommandOutput> {
        node_debug!(workdir = %self.workdir.display(), command = %command, "Executing command");

        let output = Command::new(SHELL)
            .arg("-c")
            .arg(command)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| OrchestratorError::stage("command", format!("failed to spawn {SHELL}: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(OrchestratorError::stage(
                "command",
                format!("`{command}` exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        // Diagnostics on stderr fail the command even on a zero exit
        if !stderr.trim().is_empty() {
            return Err(OrchestratorError::stage(
                "command",
                format!("`{command}` reported errors: {}", stderr.trim()),
            ));
        }

        Ok(CommandOutput { stdout })
    }
}
