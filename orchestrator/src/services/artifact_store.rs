//! Per-job artifacts in the gateway workdir

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

use crate::core::stages::configuration_file;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::ArtifactStore;
use shared::{node_debug, JobId};

pub struct RealArtifactStore {
    base_dir: PathBuf,
}

impl RealArtifactStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn path_of(&self, relative_path: &str) -> PathBuf {
        self.base_dir.join(relative_path)
    }
}

#[async_trait]
impl ArtifactStore for RealArtifactStore {
    async fn write_configuration(&self, job_id: &JobId, content: &str) -> OrchestratorResult<()> {
        let path = self.path_of(&configuration_file(job_id));
        fs::write(&path, content).await.map_err(|e| {
            OrchestratorError::stage("configure", format!("writing {}: {e}", path.display()))
        })?;
        node_debug!(job = %job_id, path = %path.display(), "Configuration file saved");
        Ok(())
    }

    async fn remove_if_exists(&self, relative_path: &str) -> OrchestratorResult<()> {
        let path = self.path_of(relative_path);
        match fs::remove_file(&path).await {
            Ok(()) => {
                node_debug!(path = %path.display(), "Stale artifact deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(OrchestratorError::IoError(e)),
        }
    }
}
