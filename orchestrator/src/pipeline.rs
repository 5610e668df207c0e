//! Generic pipeline driver
//!
//! Walks a stage list strictly in order. The first failing stage aborts the
//! rest; ledger progress updates are best effort.

use std::sync::Arc;

use crate::core::{PipelineStage, StageAction};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{ArtifactStore, CommandRunner, JobLedger};
use shared::{node_debug, node_info, node_warn, JobId};

pub struct PipelineExecutor<L, R, A>
where
    L: JobLedger,
    R: CommandRunner,
    A: ArtifactStore,
{
    ledger: Arc<L>,
    runner: Arc<R>,
    artifacts: Arc<A>,
}

impl<L, R, A> Clone for PipelineExecutor<L, R, A>
where
    L: JobLedger,
    R: CommandRunner,
    A: ArtifactStore,
{
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            runner: Arc::clone(&self.runner),
            artifacts: Arc::clone(&self.artifacts),
        }
    }
}

impl<L, R, A> PipelineExecutor<L, R, A>
where
    L: JobLedger,
    R: CommandRunner,
    A: ArtifactStore,
{
    pub fn new(ledger: Arc<L>, runner: Arc<R>, artifacts: Arc<A>) -> Self {
        Self {
            ledger,
            runner,
            artifacts,
        }
    }

    /// Run `stages` for `job_id`.
    ///
    /// # Returns
    /// Stdout of the last shell stage, i.e. the response or plot output
    pub async fn execute(&self, job_id: &JobId, stages: &[PipelineStage], content: &str) -> OrchestratorResult<String> {
        let mut output = String::new();

        for stage in stages {
            node_debug!(job = %job_id, stage = %stage.kind, "Running stage");

            match &stage.action {
                StageAction::WriteConfiguration => self
                    .artifacts
                    .write_configuration(job_id, content)
                    .await
                    .map_err(|e| OrchestratorError::stage(stage.kind.to_string(), e.to_string()))?,
                StageAction::RemoveIfExists(path) => self
                    .artifacts
                    .remove_if_exists(path)
                    .await
                    .map_err(|e| OrchestratorError::stage(stage.kind.to_string(), e.to_string()))?,
                StageAction::Shell(command) => {
                    let result = self
                        .runner
                        .run(command)
                        .await
                        .map_err(|e| OrchestratorError::stage(stage.kind.to_string(), e.to_string()))?;
                    output = result.stdout;
                }
            }

            node_info!(job = %job_id, stage = %stage.kind, "Stage completed");

            if let Some(status) = stage.completion_status {
                if let Err(e) = self.ledger.advance(job_id, status).await {
                    node_warn!(job = %job_id, error = %e, "Failed to publish job step");
                }
            }
        }

        Ok(output)
    }
}
