//! Core business logic modules
//!
//! This module contains pure logic with no I/O dependencies: request
//! planning and fingerprinting, directory resolution, the stage catalog
//! and the in-flight registry.

pub mod directory;
pub mod fingerprint;
pub mod inflight;
pub mod plan;
pub mod stages;

pub use directory::{DatasourceDirectory, ImportTarget};
pub use fingerprint::Fingerprint;
pub use inflight::{InFlightGuard, InFlightRegistry};
pub use plan::JobPlan;
pub use stages::{build_stages, PipelineStage, StageAction, StageKind};
