//! Shared types for the secure computation gateway
//!
//! Contains the request and job types seen by both the orchestration core
//! and the HTTP layer, plus the logging bootstrap every binary uses.

pub mod types;
pub mod errors;
pub mod logging;
pub mod messages;

pub use types::*;
pub use errors::*;

pub use messages::{
    // Admission bodies
    AnalysisRequest, AttributeDescriptor, AttributeSpec, FilterCondition, Filters,

    // Job lifecycle
    JobRecord, JobStatus, JobView,
};
