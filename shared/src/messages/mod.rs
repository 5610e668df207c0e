//! Message types exchanged between clients, the HTTP layer and the orchestrator
//!
//! This module organizes the wire shapes by category:
//! - `request`: Admission request bodies and their normalized attribute model
//! - `job`: Job lifecycle records returned to polling clients

pub mod request;
pub mod job;

// Re-export commonly used types at module level for convenience
pub use request::{AnalysisRequest, AttributeDescriptor, AttributeSpec, FilterCondition, Filters};

pub use job::{JobRecord, JobStatus, JobView};
