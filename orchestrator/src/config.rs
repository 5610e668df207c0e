//! Gateway configuration resolved at startup

use std::path::PathBuf;
use chrono::Duration;
use shared::DatasetKind;

use crate::error::{OrchestratorError, OrchestratorResult};

/// Result entries older than this are recomputed
pub const DEFAULT_CACHE_TTL_DAYS: i64 = 30;

/// Path clients poll for job status
pub const QUEUE_PATH: &str = "/smpc/queue";

/// How the gateway reaches the data holders and the computation runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Data holders are remote peers; compile and run happen in one step
    Smpc,
    /// Every data holder is simulated on this host
    Simulation,
}

impl DeploymentMode {
    pub fn from_flag(simulation: bool) -> Self {
        if simulation {
            DeploymentMode::Simulation
        } else {
            DeploymentMode::Smpc
        }
    }

    pub fn is_simulation(&self) -> bool {
        matches!(self, DeploymentMode::Simulation)
    }

    /// Directory document consulted for the given dataset
    pub fn directory_file(&self, dataset: DatasetKind) -> &'static str {
        match (self, dataset) {
            (DeploymentMode::Simulation, _) => "localDNS.json",
            (DeploymentMode::Smpc, DatasetKind::Cvi) => "MHMDdns_cvi.json",
            (DeploymentMode::Smpc, DatasetKind::Mesh) => "MHMDdns.json",
        }
    }
}

/// Resolved gateway settings
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub mode: DeploymentMode,
    /// Directory every external stage runs in
    pub workdir: PathBuf,
    pub cache_dir: PathBuf,
    /// Directory holding the datasource directory documents
    pub directory_dir: PathBuf,
    pub cache_ttl: Duration,
    pub queue_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::Smpc,
            workdir: PathBuf::from(".."),
            cache_dir: PathBuf::from("./cache-database"),
            directory_dir: PathBuf::from("."),
            cache_ttl: Duration::days(DEFAULT_CACHE_TTL_DAYS),
            queue_path: QUEUE_PATH.to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure deployment mode (fluent API)
    pub fn with_mode(mut self, mode: DeploymentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Configure stage working directory (fluent API)
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    /// Configure result cache directory (fluent API)
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Configure directory document location (fluent API)
    pub fn with_directory_dir(mut self, directory_dir: impl Into<PathBuf>) -> Self {
        self.directory_dir = directory_dir.into();
        self
    }

    /// Configure cache validity window in days (fluent API)
    pub fn with_cache_ttl_days(mut self, days: i64) -> Self {
        self.cache_ttl = Duration::days(days);
        self
    }

    /// Reject settings the gateway cannot run with
    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.cache_ttl <= Duration::zero() {
            return Err(OrchestratorError::config(format!(
                "cache_ttl must be positive, got {} days",
                self.cache_ttl.num_days()
            )));
        }
        if self.queue_path.is_empty() || !self.queue_path.starts_with('/') {
            return Err(OrchestratorError::config(format!(
                "queue_path must be an absolute path, got '{}'",
                self.queue_path
            )));
        }
        Ok(())
    }

    /// Polling location handed to clients for a job
    pub fn location_for(&self, job_id: &shared::JobId) -> String {
        format!("{}?request={}", self.queue_path, job_id)
    }
}
