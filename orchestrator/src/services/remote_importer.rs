//! Import from remote data holders over HTTP

use async_trait::async_trait;
use serde_json::json;

use crate::core::ImportTarget;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{ImportRequest, Importer};
use shared::{node_debug, node_info};

/// Asks each peer node to stage the job's attributes under a per-job table
pub struct RemoteImporter {
    client: reqwest::Client,
}

impl RemoteImporter {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Import endpoint of a peer. Directory addresses are usually bare
    /// `host:port`; explicit schemes are kept.
    pub fn endpoint(address: &str, action: &str) -> String {
        let base = address.trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            format!("{base}{action}")
        } else {
            format!("http://{base}{action}")
        }
    }
}

impl Default for RemoteImporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Importer for RemoteImporter {
    async fn prepare(&self, _request: &ImportRequest, targets: Vec<ImportTarget>) -> OrchestratorResult<Vec<ImportTarget>> {
        Ok(targets)
    }

    async fn import(&self, request: &ImportRequest, target: &ImportTarget) -> OrchestratorResult<()> {
        let url = Self::endpoint(&target.location, request.dataset.import_action());
        let body = json!({
            "attributes": request.attributes,
            "datasource": request.table_name(&target.datasource),
        });

        node_debug!(job = %request.job_id, datasource = %target.datasource, url = %url, "Requesting import");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OrchestratorError::import(&target.datasource, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(OrchestratorError::import(
                &target.datasource,
                format!("{url} answered {status}: {detail}"),
            ));
        }

        node_info!(job = %request.job_id, datasource = %target.datasource, "Import completed");
        Ok(())
    }
}
