//! Directory documents read from disk

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

use crate::config::DeploymentMode;
use crate::core::DatasourceDirectory;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::DirectoryProvider;
use shared::{node_debug, DatasetKind};

/// Reads the directory document for each request, so edits apply without
/// a restart
pub struct FileDirectoryProvider {
    base_dir: PathBuf,
    mode: DeploymentMode,
}

impl FileDirectoryProvider {
    pub fn new(base_dir: impl Into<PathBuf>, mode: DeploymentMode) -> Self {
        Self {
            base_dir: base_dir.into(),
            mode,
        }
    }

    pub fn document_path(&self, dataset: DatasetKind) -> PathBuf {
        self.base_dir.join(self.mode.directory_file(dataset))
    }
}

#[async_trait]
impl DirectoryProvider for FileDirectoryProvider {
    async fn load(&self, dataset: DatasetKind) -> OrchestratorResult<DatasourceDirectory> {
        let path = self.document_path(dataset);
        let unavailable = |message: String| OrchestratorError::DirectoryUnavailable {
            path: path.display().to_string(),
            message,
        };

        let content = fs::read_to_string(&path).await.map_err(|e| unavailable(e.to_string()))?;
        let document: serde_json::Value = serde_json::from_str(&content).map_err(|e| unavailable(e.to_string()))?;
        let directory = DatasourceDirectory::from_document(dataset, &document)?;

        node_debug!(path = %path.display(), datasources = directory.len(), "Directory loaded");
        Ok(directory)
    }
}
