//! In-memory job ledger
//!
//! Job records are ephemeral: they live as long as the gateway process.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::JobLedger;
use shared::{node_debug, JobId, JobRecord};

#[derive(Debug, Default)]
pub struct MemoryJobLedger {
    records: RwLock<HashMap<JobId, JobRecord>>,
}

impl MemoryJobLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Replace a job's record unless it already reached a terminal state
    async fn put(&self, job_id: &JobId, record: JobRecord) -> OrchestratorResult<()> {
        let mut records = self.records.write().await;
        if let Some(existing) = records.get(job_id) {
            if existing.is_terminal() {
                return Err(OrchestratorError::ledger(format!(
                    "job {job_id} already finished as {:?}",
                    existing.status
                )));
            }
        }
        node_debug!(job = %job_id, status = ?record.status, step = ?record.step, "Job record updated");
        records.insert(job_id.clone(), record);
        Ok(())
    }
}

#[async_trait]
impl JobLedger for MemoryJobLedger {
    async fn create(&self, job_id: &JobId) -> OrchestratorResult<()> {
        self.put(job_id, JobRecord::running()).await
    }

    async fn advance(&self, job_id: &JobId, step: &str) -> OrchestratorResult<()> {
        self.put(job_id, JobRecord::at_step(step)).await
    }

    async fn succeed(&self, job_id: &JobId, result: Value) -> OrchestratorResult<()> {
        self.put(job_id, JobRecord::succeeded(result)).await
    }

    async fn fail(&self, job_id: &JobId) -> OrchestratorResult<()> {
        self.put(job_id, JobRecord::failed()).await
    }

    async fn get(&self, job_id: &JobId) -> OrchestratorResult<Option<JobRecord>> {
        Ok(self.records.read().await.get(job_id).cloned())
    }
}
