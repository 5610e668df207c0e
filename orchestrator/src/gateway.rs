//! Request admission and response delivery
//!
//! The gateway ties the pieces together: it plans the request, consults
//! the result cache, runs the import barrier and the stage pipeline, and
//! delivers the result either synchronously (plot mode) or through the job
//! ledger (everything else).

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::GatewayConfig;
use crate::core::{build_stages, InFlightRegistry, JobPlan};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::import::ImportCoordinator;
use crate::pipeline::PipelineExecutor;
use crate::traits::{
    Admission, ArtifactStore, CacheEntry, CommandRunner, DirectoryProvider, Importer, JobGateway, JobLedger,
    ResultCache,
};
use shared::{node_error, node_info, node_warn, AlgorithmFamily, JobId, JobRecord};

/// Step published while data holders stage the job's data
pub const IMPORT_STEP: &str = "Securely importing data";

pub struct Gateway<L, C, D, I, R, A>
where
    L: JobLedger + 'static,
    C: ResultCache + 'static,
    D: DirectoryProvider + 'static,
    I: Importer + 'static,
    R: CommandRunner + 'static,
    A: ArtifactStore + 'static,
{
    config: Arc<GatewayConfig>,
    ledger: Arc<L>,
    cache: Arc<C>,
    imports: ImportCoordinator<D, I>,
    pipeline: PipelineExecutor<L, R, A>,
    inflight: InFlightRegistry,
}

impl<L, C, D, I, R, A> Clone for Gateway<L, C, D, I, R, A>
where
    L: JobLedger + 'static,
    C: ResultCache + 'static,
    D: DirectoryProvider + 'static,
    I: Importer + 'static,
    R: CommandRunner + 'static,
    A: ArtifactStore + 'static,
{
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            ledger: Arc::clone(&self.ledger),
            cache: Arc::clone(&self.cache),
            imports: self.imports.clone(),
            pipeline: self.pipeline.clone(),
            inflight: self.inflight.clone(),
        }
    }
}

impl<L, C, D, I, R, A> Gateway<L, C, D, I, R, A>
where
    L: JobLedger + 'static,
    C: ResultCache + 'static,
    D: DirectoryProvider + 'static,
    I: Importer + 'static,
    R: CommandRunner + 'static,
    A: ArtifactStore + 'static,
{
    pub fn new(
        config: GatewayConfig,
        ledger: L,
        cache: C,
        directory: D,
        importer: I,
        runner: R,
        artifacts: A,
    ) -> Self {
        let ledger = Arc::new(ledger);
        Self {
            config: Arc::new(config),
            cache: Arc::new(cache),
            imports: ImportCoordinator::new(Arc::new(directory), Arc::new(importer)),
            pipeline: PipelineExecutor::new(Arc::clone(&ledger), Arc::new(runner), Arc::new(artifacts)),
            ledger,
            inflight: InFlightRegistry::new(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn inflight(&self) -> &InFlightRegistry {
        &self.inflight
    }

    /// Run a job to completion and mark it failed on any error
    async fn process(&self, job_id: &JobId, plan: &JobPlan) -> OrchestratorResult<String> {
        match self.compute(job_id, plan).await {
            Ok(body) => Ok(body),
            Err(e) => {
                node_error!(job = %job_id, error = %e, "Job failed");
                if let Err(ledger_err) = self.ledger.fail(job_id).await {
                    node_warn!(job = %job_id, error = %ledger_err, "Failed to record job failure");
                }
                Err(e)
            }
        }
    }

    async fn compute(&self, job_id: &JobId, plan: &JobPlan) -> OrchestratorResult<String> {
        if plan.use_cache {
            match self.cache.lookup(&plan.fingerprint).await {
                Ok(Some(entry)) => {
                    node_info!(job = %job_id, "Result found in cache");
                    return Ok(self.deliver_cached(job_id, plan, entry).await);
                }
                Ok(None) => node_info!(job = %job_id, "Result not found in cache"),
                Err(e) => node_warn!(job = %job_id, error = %e, "Cache read failed, recomputing"),
            }
        } else {
            node_info!(job = %job_id, "Cache disabled by request, recomputing");
        }

        let guard = self.inflight.begin(&plan.fingerprint);
        if guard.is_duplicate() {
            node_warn!(
                job = %job_id,
                duplicates = self.inflight.duplicate_computations(),
                "Identical request already computing, result will be computed twice"
            );
        }

        let imports = self.imports.plan(job_id, plan).await?;
        self.publish_step(job_id, IMPORT_STEP).await;
        self.imports.execute(imports).await?;

        let stages = build_stages(plan, self.config.mode, job_id);
        let output = self.pipeline.execute(job_id, &stages, &plan.content).await?;

        let (body, result, payload) = if plan.plot {
            let graph = output.trim_end().to_string();
            let payload = Value::String(output.replace('\n', ""));
            (graph.clone(), Value::String(graph), payload)
        } else {
            let result: Value = serde_json::from_str(&output).map_err(|e| OrchestratorError::MalformedOutput {
                message: format!("response is not valid JSON: {e}"),
            })?;
            (result.to_string(), result.clone(), result)
        };

        // The entry must exist before the job is observable as succeeded
        if let Err(e) = self.cache.store(&plan.fingerprint, payload).await {
            node_warn!(job = %job_id, error = %e, "Failed to store result in cache");
        }
        if let Err(e) = self.ledger.succeed(job_id, result).await {
            node_warn!(job = %job_id, error = %e, "Failed to record job result");
        }

        node_info!(job = %job_id, "Response ready");
        drop(guard);
        Ok(body)
    }

    /// Serve a cache hit without running any stage
    async fn deliver_cached(&self, job_id: &JobId, plan: &JobPlan, entry: CacheEntry) -> String {
        let (body, result) = match (plan.plot, entry.payload) {
            (true, Value::String(graph)) => (graph.clone(), Value::String(graph)),
            (_, payload) => (payload.to_string(), payload),
        };

        if let Err(e) = self.ledger.succeed(job_id, result).await {
            node_warn!(job = %job_id, error = %e, "Failed to record cached result");
        }
        body
    }

    /// Run the job on its own task, independent of whoever admitted it.
    ///
    /// A job task that panics is recorded as failed.
    fn spawn_job(&self, job_id: JobId, plan: JobPlan) -> JoinHandle<OrchestratorResult<String>> {
        let gateway = self.clone();
        tokio::spawn(async move {
            let worker = {
                let gateway = gateway.clone();
                let job_id = job_id.clone();
                tokio::spawn(async move { gateway.process(&job_id, &plan).await })
            };

            match worker.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    node_error!(job = %job_id, error = %e, "Job task aborted");
                    if let Err(ledger_err) = gateway.ledger.fail(&job_id).await {
                        node_warn!(job = %job_id, error = %ledger_err, "Failed to record job failure");
                    }
                    Err(OrchestratorError::JobAborted { message: e.to_string() })
                }
            }
        })
    }

    async fn publish_step(&self, job_id: &JobId, step: &str) {
        if let Err(e) = self.ledger.advance(job_id, step).await {
            node_warn!(job = %job_id, error = %e, "Failed to publish job step");
        }
    }
}

#[async_trait]
impl<L, C, D, I, R, A> JobGateway for Gateway<L, C, D, I, R, A>
where
    L: JobLedger + 'static,
    C: ResultCache + 'static,
    D: DirectoryProvider + 'static,
    I: Importer + 'static,
    R: CommandRunner + 'static,
    A: ArtifactStore + 'static,
{
    async fn submit(&self, family: AlgorithmFamily, body: Value) -> OrchestratorResult<Admission> {
        let plan = JobPlan::resolve(family, &body)?;
        let job_id = JobId::new();

        if let Err(e) = self.ledger.create(&job_id).await {
            node_warn!(job = %job_id, error = %e, "Failed to record new job");
        }
        node_info!(job = %job_id, algorithm = %family, plot = plan.plot, "Request admitted");

        let plot = plan.plot;
        let job = self.spawn_job(job_id.clone(), plan);

        if plot {
            // Dropping the handle detaches the job, it still runs to completion
            let body = match job.await {
                Ok(outcome) => outcome?,
                Err(e) => return Err(OrchestratorError::JobAborted { message: e.to_string() }),
            };
            return Ok(Admission::Delivered { job_id, body });
        }

        Ok(Admission::Accepted {
            location: self.config.location_for(&job_id),
            job_id,
        })
    }

    async fn poll(&self, job_id: &JobId) -> OrchestratorResult<Option<JobRecord>> {
        self.ledger.get(job_id).await
    }

    fn duplicate_computations(&self) -> u64 {
        self.inflight.duplicate_computations()
    }
}
