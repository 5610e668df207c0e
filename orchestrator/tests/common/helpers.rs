//! Test helpers and builder patterns for orchestrator tests
//!
//! Integration tests drive a real gateway: in-memory ledger, file-backed
//! cache and artifact store in temporary directories, a mocked directory
//! and recording stand-ins for the importer and the command runner.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use orchestrator::services::{FileResultCache, MemoryJobLedger, RealArtifactStore};
use orchestrator::traits::{CommandOutput, MockDirectoryProvider};
use orchestrator::*;
use shared::{AlgorithmFamily, JobId, JobRecord};

use super::fixtures::TestFixtures;

pub type TestGateway =
    Gateway<MemoryJobLedger, FileResultCache, MockDirectoryProvider, RecordingImporter, ScriptedRunner, RealArtifactStore>;

/// Command runner that records every command and answers the final
/// response stage with a canned output
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    commands: Arc<Mutex<Vec<String>>>,
    response: String,
    delay: Option<Duration>,
    fail_on: Option<String>,
}

impl ScriptedRunner {
    pub fn responding(stdout: &str) -> Self {
        Self {
            response: stdout.to_string(),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail any command containing `needle`
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    fn is_response_stage(command: &str) -> bool {
        command.starts_with("python web/") || command.starts_with("cd web")
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str) -> OrchestratorResult<CommandOutput> {
        self.commands.lock().unwrap().push(command.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(needle) = &self.fail_on {
            if command.contains(needle.as_str()) {
                return Err(OrchestratorError::stage("command", format!("`{command}` failed")));
            }
        }

        let stdout = if Self::is_response_stage(command) {
            self.response.clone()
        } else {
            String::new()
        };
        Ok(CommandOutput { stdout })
    }
}

/// Importer that records which datasources were imported
#[derive(Clone, Default)]
pub struct RecordingImporter {
    imported: Arc<Mutex<Vec<String>>>,
    failing: Arc<HashSet<String>>,
}

impl RecordingImporter {
    pub fn failing_for(datasources: &[&str]) -> Self {
        Self {
            failing: Arc::new(datasources.iter().map(|d| d.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn imported(&self) -> Vec<String> {
        let mut imported = self.imported.lock().unwrap().clone();
        imported.sort();
        imported
    }
}

#[async_trait]
impl Importer for RecordingImporter {
    async fn prepare(&self, _request: &ImportRequest, targets: Vec<ImportTarget>) -> OrchestratorResult<Vec<ImportTarget>> {
        Ok(targets)
    }

    async fn import(&self, _request: &ImportRequest, target: &ImportTarget) -> OrchestratorResult<()> {
        self.imported.lock().unwrap().push(target.datasource.clone());
        if self.failing.contains(&target.datasource) {
            return Err(OrchestratorError::import(&target.datasource, "peer refused import"));
        }
        Ok(())
    }
}

/// Gateway under test plus handles to inspect its collaborators
pub struct TestHarness {
    pub gateway: TestGateway,
    pub runner: ScriptedRunner,
    pub importer: RecordingImporter,
    pub cache_dir: TempDir,
    pub work_dir: TempDir,
}

impl TestHarness {
    /// Second view on the harness cache directory
    pub fn cache(&self) -> FileResultCache {
        FileResultCache::new(self.cache_dir.path())
    }

    pub fn plan(&self, family: AlgorithmFamily, body: &Value) -> JobPlan {
        JobPlan::resolve(family, body).unwrap()
    }

    /// Number of commands that belong to the stage pipeline
    pub fn pipeline_runs(&self) -> usize {
        self.runner
            .commands()
            .iter()
            .filter(|c| ScriptedRunner::is_response_stage(c))
            .count()
    }
}

/// Builder for test gateways with sensible defaults
pub struct GatewayBuilder {
    config: GatewayConfig,
    runner: ScriptedRunner,
    importer: RecordingImporter,
    directory: Value,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::new().with_mode(DeploymentMode::Simulation),
            runner: ScriptedRunner::responding(TestFixtures::RESPONSE_OUTPUT),
            importer: RecordingImporter::default(),
            directory: TestFixtures::directory_document(),
        }
    }

    pub fn with_runner(mut self, runner: ScriptedRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_importer(mut self, importer: RecordingImporter) -> Self {
        self.importer = importer;
        self
    }

    pub fn with_mode(mut self, mode: DeploymentMode) -> Self {
        self.config = self.config.with_mode(mode);
        self
    }

    pub fn build(self) -> TestHarness {
        let cache_dir = TempDir::new().unwrap();
        let work_dir = TempDir::new().unwrap();

        let document = self.directory;
        let mut directory = MockDirectoryProvider::new();
        directory
            .expect_load()
            .returning(move |dataset| DatasourceDirectory::from_document(dataset, &document))
            .times(0..);

        let gateway = Gateway::new(
            self.config.with_workdir(work_dir.path()).with_cache_dir(cache_dir.path()),
            MemoryJobLedger::new(),
            FileResultCache::new(cache_dir.path()),
            directory,
            self.importer.clone(),
            self.runner.clone(),
            RealArtifactStore::new(work_dir.path()),
        );

        TestHarness {
            gateway,
            runner: self.runner,
            importer: self.importer,
            cache_dir,
            work_dir,
        }
    }
}

/// Common assertions and waits
pub struct TestHelpers;

impl TestHelpers {
    /// Poll until the job reaches a terminal state
    pub async fn wait_for_terminal(gateway: &impl JobGateway, job_id: &JobId) -> JobRecord {
        for _ in 0..200 {
            if let Some(record) = gateway.poll(job_id).await.unwrap() {
                if record.is_terminal() {
                    return record;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {job_id} did not finish in time");
    }

    /// Submit a non-plot request and return its job id
    pub async fn submit_async(gateway: &impl JobGateway, family: AlgorithmFamily, body: Value) -> JobId {
        match gateway.submit(family, body).await.unwrap() {
            Admission::Accepted { job_id, location } => {
                assert_eq!(location, format!("/smpc/queue?request={job_id}"));
                job_id
            }
            other => panic!("expected asynchronous admission, got {other:?}"),
        }
    }
}
