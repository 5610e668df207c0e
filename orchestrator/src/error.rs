//! Orchestrator-specific error types

use thiserror::Error;
use shared::{DatasetKind, SharedError};

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Unable to find {dataset} location for {datasource}, it is not listed in the directory")]
    UnknownDatasource { datasource: String, dataset: DatasetKind },

    #[error("Datasource directory unavailable: {path}: {message}")]
    DirectoryUnavailable { path: String, message: String },

    #[error("Import from {datasource} failed: {message}")]
    ImportFailed { datasource: String, message: String },

    #[error("Import barrier failed: {failed} of {total} datasources did not import")]
    ImportBarrierFailed { failed: usize, total: usize },

    #[error("Pipeline stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    #[error("Stage output could not be interpreted: {message}")]
    MalformedOutput { message: String },

    #[error("Job task aborted: {message}")]
    JobAborted { message: String },

    #[error("Job ledger operation failed: {message}")]
    LedgerError { message: String },

    #[error("Result cache operation failed: {message}")]
    CacheError { message: String },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl OrchestratorError {
    pub fn validation(message: impl Into<String>) -> Self {
        OrchestratorError::InvalidRequest { message: message.into() }
    }

    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        OrchestratorError::StageFailed {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn import(datasource: impl Into<String>, message: impl Into<String>) -> Self {
        OrchestratorError::ImportFailed {
            datasource: datasource.into(),
            message: message.into(),
        }
    }

    pub fn ledger(message: impl Into<String>) -> Self {
        OrchestratorError::LedgerError { message: message.into() }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        OrchestratorError::CacheError { message: message.into() }
    }

    pub fn config(field: impl Into<String>) -> Self {
        OrchestratorError::ConfigurationError { field: field.into() }
    }

    /// Failures caused by the request itself; these are never retried and
    /// surface as HTTP 400 when detected synchronously
    pub fn is_validation(&self) -> bool {
        match self {
            OrchestratorError::InvalidRequest { .. } | OrchestratorError::UnknownDatasource { .. } => true,
            OrchestratorError::SharedError(inner) => inner.is_client_error(),
            _ => false,
        }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
