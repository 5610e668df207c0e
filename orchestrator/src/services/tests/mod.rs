//! Service-specific tests
//!
//! This module contains tests for the production service implementations.
//! Each service has its own test file.

mod result_cache;

// Common test utilities for services
pub mod common {
    use shared::{DatasetKind, JobId};

    use crate::traits::ImportRequest;

    /// Deterministic job id for assertions on generated names
    pub fn test_job_id(suffix: &str) -> JobId {
        JobId::from_string(&format!("550e8400-e29b-41d4-a716-44665544{:0>4}", suffix)).expect("Valid test job ID")
    }

    pub fn import_request(dataset: DatasetKind, attributes: &[&str]) -> ImportRequest {
        ImportRequest {
            job_id: test_job_id("0001"),
            dataset,
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }
}
