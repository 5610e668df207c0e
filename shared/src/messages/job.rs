//! Job lifecycle records as published to polling clients

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Succeeded,
    Failed,
}

/// Current lifecycle state of one job
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct JobRecord {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl JobRecord {
    pub fn running() -> Self {
        Self {
            status: JobStatus::Running,
            step: None,
            result: None,
        }
    }

    pub fn at_step(step: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Running,
            step: Some(step.into()),
            result: None,
        }
    }

    pub fn succeeded(result: Value) -> Self {
        Self {
            status: JobStatus::Succeeded,
            step: None,
            result: Some(result),
        }
    }

    pub fn failed() -> Self {
        Self {
            status: JobStatus::Failed,
            step: None,
            result: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// Body returned by the polling endpoint
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum JobView {
    Known(JobRecord),
    NotStarted { status: &'static str },
}

impl From<Option<JobRecord>> for JobView {
    fn from(record: Option<JobRecord>) -> Self {
        match record {
            Some(record) => JobView::Known(record),
            None => JobView::NotStarted { status: "not_started" },
        }
    }
}
