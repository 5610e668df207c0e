//! Request and response bodies of the HTTP surface

use serde::{Deserialize, Serialize};

/// Query string of the polling endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueQuery {
    pub request: Option<String>,
}

/// Body of a `202 Accepted` admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationResponse {
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub simulation: bool,
    /// Computations started while an identical one was still running
    pub duplicate_computations: u64,
}
