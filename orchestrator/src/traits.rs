//! Trait definitions with mockall annotations for testing
//!
//! Every piece of I/O the gateway performs sits behind one of these traits:
//! the job ledger, the result cache, the datasource directory, the import
//! strategies, external commands and per-job artifacts. Production
//! implementations live in `services`; tests use the generated mocks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{DatasourceDirectory, Fingerprint, ImportTarget};
use crate::error::OrchestratorResult;
use shared::{AlgorithmFamily, DatasetKind, JobId, JobRecord};

/// A cached computation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Full canonical key, kept to detect digest collisions
    pub fingerprint: String,
    pub payload: Value,
    pub computed_at: DateTime<Utc>,
}

/// What an importer needs to stage data for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub job_id: JobId,
    pub dataset: DatasetKind,
    pub attributes: Vec<String>,
}

impl ImportRequest {
    /// Table name the data holder stages this job's data under
    pub fn table_name(&self, datasource: &str) -> String {
        format!("{}_{}", datasource, self.job_id)
    }
}

/// Captured output of an external command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub stdout: String,
}

/// Outcome of admitting a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Non-plot request running in the background; poll `location`
    Accepted { job_id: JobId, location: String },
    /// Plot request completed synchronously
    Delivered { job_id: JobId, body: String },
}

/// Per-job lifecycle store polled by clients
///
/// Writes to a job that already reached a terminal state are rejected.
#[mockall::automock]
#[async_trait::async_trait]
pub trait JobLedger: Send + Sync {
    /// Record a new job as running with no step
    async fn create(&self, job_id: &JobId) -> OrchestratorResult<()>;

    /// Publish the step a running job reached
    async fn advance(&self, job_id: &JobId, step: &str) -> OrchestratorResult<()>;

    /// Mark a job succeeded with its structured result
    async fn succeed(&self, job_id: &JobId, result: Value) -> OrchestratorResult<()>;

    /// Mark a job failed
    async fn fail(&self, job_id: &JobId) -> OrchestratorResult<()>;

    /// Current record; `None` when the job was never created
    async fn get(&self, job_id: &JobId) -> OrchestratorResult<Option<JobRecord>>;
}

/// Content-addressed store of computed results
#[mockall::automock]
#[async_trait::async_trait]
pub trait ResultCache: Send + Sync {
    /// Fetch a valid entry.
    ///
    /// # Returns
    /// `None` on a miss. An entry older than the validity window is
    /// deleted and reported as a miss.
    async fn lookup(&self, fingerprint: &Fingerprint) -> OrchestratorResult<Option<CacheEntry>>;

    /// Record `payload` as computed now, replacing any existing entry
    async fn store(&self, fingerprint: &Fingerprint, payload: Value) -> OrchestratorResult<()>;
}

/// Source of datasource directories
#[mockall::automock]
#[async_trait::async_trait]
pub trait DirectoryProvider: Send + Sync {
    /// Load the directory that applies to `dataset` in the current deployment
    async fn load(&self, dataset: DatasetKind) -> OrchestratorResult<DatasourceDirectory>;
}

/// One import strategy (remote peers or local simulation)
#[mockall::automock]
#[async_trait::async_trait]
pub trait Importer: Send + Sync {
    /// Prepare validated targets before fan-out, possibly rewriting their
    /// locations. Runs once per job, before any `import` call.
    async fn prepare(&self, request: &ImportRequest, targets: Vec<ImportTarget>) -> OrchestratorResult<Vec<ImportTarget>>;

    /// Stage the requested attributes of one datasource for the job
    async fn import(&self, request: &ImportRequest, target: &ImportTarget) -> OrchestratorResult<()>;
}

/// Runs external shell commands in the gateway workdir
#[mockall::automock]
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion.
    ///
    /// # Returns
    /// Captured stdout. A non-zero exit or any stderr output is an error.
    async fn run(&self, command: &str) -> OrchestratorResult<CommandOutput>;
}

/// Per-job files in the gateway workdir
#[mockall::automock]
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist the raw request body as the job's configuration artifact
    async fn write_configuration(&self, job_id: &JobId, content: &str) -> OrchestratorResult<()>;

    /// Delete a workdir-relative file; a missing file is not an error
    async fn remove_if_exists(&self, relative_path: &str) -> OrchestratorResult<()>;
}

/// Admission and polling surface consumed by the HTTP layer
#[mockall::automock]
#[async_trait::async_trait]
pub trait JobGateway: Send + Sync {
    /// Admit a raw request body on the `family` endpoint
    async fn submit(&self, family: AlgorithmFamily, body: Value) -> OrchestratorResult<Admission>;

    /// Current record of a job, `None` when unknown
    async fn poll(&self, job_id: &JobId) -> OrchestratorResult<Option<JobRecord>>;

    /// Computations started while an identical one was in flight
    fn duplicate_computations(&self) -> u64;
}
