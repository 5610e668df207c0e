//! Simulated import: every data holder is a local file

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::stages::shell_quote;
use crate::core::ImportTarget;
use crate::error::OrchestratorResult;
use crate::traits::{CommandRunner, ImportRequest, Importer};
use shared::{node_info, DatasetKind};

/// Stages local datasets through the simulation scripts
pub struct LocalImporter<R: CommandRunner> {
    runner: Arc<R>,
}

impl<R: CommandRunner> LocalImporter<R> {
    pub fn new(runner: Arc<R>) -> Self {
        Self { runner }
    }

    /// Tabular file a coded patient file is converted into for this job
    pub fn converted_path(request: &ImportRequest, datasource: &str) -> String {
        format!("./datasets/{}.csv", request.table_name(datasource))
    }

    pub fn conversion_command(request: &ImportRequest, patient_file: &str, output: &str) -> String {
        format!(
            "python mhmd-driver/mesh_json_to_csv.py {} {} --output {} \
             --mtrees ./mhmd-driver/m.json --mtrees_inverted ./mhmd-driver/m_inv.json \
             --mapping ./mhmd-driver/mesh_mapping.json",
            shell_quote(&request.attributes.join(" ")),
            shell_quote(patient_file),
            shell_quote(output)
        )
    }

    pub fn import_command(request: &ImportRequest, target: &ImportTarget) -> String {
        format!(
            "python ./dataset-scripts/simulated_import.py {} --attributes {} --table {}",
            shell_quote(&target.location),
            shell_quote(&request.attributes.join(";")),
            shell_quote(&request.table_name(&target.datasource))
        )
    }
}

#[async_trait]
impl<R: CommandRunner> Importer for LocalImporter<R> {
    /// Coded patient files are converted to tabular form one at a time
    /// before any import starts
    async fn prepare(&self, request: &ImportRequest, targets: Vec<ImportTarget>) -> OrchestratorResult<Vec<ImportTarget>> {
        if request.dataset != DatasetKind::Mesh {
            return Ok(targets);
        }

        let mut converted = Vec::with_capacity(targets.len());
        for target in targets {
            let output = Self::converted_path(request, &target.datasource);
            self.runner
                .run(&Self::conversion_command(request, &target.location, &output))
                .await?;
            node_info!(job = %request.job_id, datasource = %target.datasource, "Converted coded records");
            converted.push(ImportTarget {
                datasource: target.datasource,
                location: output,
            });
        }
        Ok(converted)
    }

    async fn import(&self, request: &ImportRequest, target: &ImportTarget) -> OrchestratorResult<()> {
        self.runner.run(&Self::import_command(request, target)).await?;
        node_info!(job = %request.job_id, datasource = %target.datasource, "Simulated import completed");
        Ok(())
    }
}
