//! Import coordination
//!
//! Validation and dispatch are separate phases: `plan` resolves every
//! requested datasource against the directory and fails before any import
//! is issued, `execute` fans the imports out and waits for all of them.

use futures_util::future::join_all;
use std::sync::Arc;

use crate::core::{ImportTarget, JobPlan};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{DirectoryProvider, ImportRequest, Importer};
use shared::{node_debug, node_error, node_info, JobId};

/// Validated import work for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    pub request: ImportRequest,
    pub targets: Vec<ImportTarget>,
}

pub struct ImportCoordinator<D, I>
where
    D: DirectoryProvider,
    I: Importer,
{
    directory: Arc<D>,
    importer: Arc<I>,
}

impl<D, I> Clone for ImportCoordinator<D, I>
where
    D: DirectoryProvider,
    I: Importer,
{
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            importer: Arc::clone(&self.importer),
        }
    }
}

impl<D, I> ImportCoordinator<D, I>
where
    D: DirectoryProvider,
    I: Importer,
{
    pub fn new(directory: Arc<D>, importer: Arc<I>) -> Self {
        Self { directory, importer }
    }

    /// Resolve the job's datasources. Any unknown name fails the whole plan.
    pub async fn plan(&self, job_id: &JobId, plan: &JobPlan) -> OrchestratorResult<ImportPlan> {
        let directory = self.directory.load(plan.dataset).await?;
        let targets = directory.resolve(plan.datasources.as_deref())?;

        if targets.is_empty() {
            return Err(OrchestratorError::validation(format!(
                "no {} datasources are listed in the directory",
                plan.dataset.key()
            )));
        }

        node_debug!(job = %job_id, datasources = targets.len(), "Import plan resolved");

        Ok(ImportPlan {
            request: ImportRequest {
                job_id: job_id.clone(),
                dataset: plan.dataset,
                attributes: plan.import_attributes.clone(),
            },
            targets,
        })
    }

    /// Run every import concurrently and wait for all of them.
    ///
    /// Each failure is logged; if any import failed the job fails.
    pub async fn execute(&self, plan: ImportPlan) -> OrchestratorResult<()> {
        let ImportPlan { request, targets } = plan;
        let targets = self.importer.prepare(&request, targets).await?;
        let total = targets.len();

        let outcomes = join_all(targets.iter().map(|target| self.importer.import(&request, target))).await;

        let mut failed = 0;
        for (target, outcome) in targets.iter().zip(outcomes) {
            if let Err(e) = outcome {
                failed += 1;
                node_error!(
                    job = %request.job_id,
                    datasource = %target.datasource,
                    error = %e,
                    "Import failed"
                );
            }
        }

        if failed > 0 {
            return Err(OrchestratorError::ImportBarrierFailed { failed, total });
        }

        node_info!(job = %request.job_id, datasources = total, "Importing finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DatasourceDirectory;
    use crate::traits::{MockDirectoryProvider, MockImporter};
    use serde_json::json;
    use shared::{AlgorithmFamily, DatasetKind};

    fn directory(names: &[&str]) -> MockDirectoryProvider {
        let entries: serde_json::Map<String, serde_json::Value> = names
            .iter()
            .map(|name| (name.to_string(), json!(format!("{name}.example:3000"))))
            .collect();
        let document = serde_json::Value::Object(entries);

        let mut provider = MockDirectoryProvider::new();
        provider
            .expect_load()
            .returning(move |dataset| DatasourceDirectory::from_document(dataset, &document));
        provider
    }

    fn histogram_plan(body: serde_json::Value) -> JobPlan {
        JobPlan::resolve(AlgorithmFamily::Histogram, &body).unwrap()
    }

    #[tokio::test]
    async fn test_plan_carries_import_attributes_and_table_names() {
        let coordinator = ImportCoordinator::new(Arc::new(directory(&["A", "B"])), Arc::new(MockImporter::new()));
        let job = JobId::new();

        let plan = coordinator
            .plan(&job, &histogram_plan(json!({ "attributes": ["age"], "datasources": ["B"] })))
            .await
            .unwrap();

        assert_eq!(plan.request.dataset, DatasetKind::Cvi);
        assert_eq!(plan.request.attributes, vec!["age"]);
        assert_eq!(plan.targets.len(), 1);
        assert_eq!(plan.request.table_name("B"), format!("B_{job}"));
    }

    #[tokio::test]
    async fn test_unknown_datasource_fails_before_any_import() {
        let mut importer = MockImporter::new();
        importer.expect_prepare().never();
        importer.expect_import().never();
        let coordinator = ImportCoordinator::new(Arc::new(directory(&["A"])), Arc::new(importer));

        let err = coordinator
            .plan(&JobId::new(), &histogram_plan(json!({ "attributes": ["age"], "datasources": ["A", "B"] })))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_single_failure_fails_the_barrier_after_all_complete() {
        let mut importer = MockImporter::new();
        importer.expect_prepare().returning(|_, targets| Ok(targets));
        importer.expect_import().times(3).returning(|_, target| {
            if target.datasource == "B" {
                Err(OrchestratorError::import("B", "connection refused"))
            } else {
                Ok(())
            }
        });
        let coordinator = ImportCoordinator::new(Arc::new(directory(&["A", "B", "C"])), Arc::new(importer));
        let job = JobId::new();

        let plan = coordinator.plan(&job, &histogram_plan(json!({ "attributes": ["age"] }))).await.unwrap();
        let err = coordinator.execute(plan).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::ImportBarrierFailed { failed: 1, total: 3 }));
    }

    #[tokio::test]
    async fn test_empty_directory_is_rejected() {
        let coordinator = ImportCoordinator::new(Arc::new(directory(&[])), Arc::new(MockImporter::new()));
        let err = coordinator
            .plan(&JobId::new(), &histogram_plan(json!({ "attributes": ["age"] })))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
