//! Orchestration core of the secure computation gateway
//!
//! Turns analysis requests into canonical fingerprints, reuses cached
//! results, fans imports out to the data holders behind an all-or-nothing
//! barrier, and drives the external stage pipeline while publishing job
//! status for polling clients.

pub mod config;
pub mod core;
pub mod error;
pub mod gateway;
pub mod import;
pub mod pipeline;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{DeploymentMode, GatewayConfig};
pub use core::{DatasourceDirectory, Fingerprint, ImportTarget, InFlightRegistry, JobPlan, PipelineStage};
pub use error::{OrchestratorError, OrchestratorResult};
pub use gateway::Gateway;
pub use import::{ImportCoordinator, ImportPlan};
pub use pipeline::PipelineExecutor;
pub use traits::{
    Admission, ArtifactStore, CacheEntry, CommandRunner, DirectoryProvider, ImportRequest, Importer, JobGateway,
    JobLedger, ResultCache,
};
