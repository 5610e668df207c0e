//! Shared error types for the computation gateway

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid job identifier: {input}")]
    InvalidJobId { input: String },
}

impl SharedError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        SharedError::InvalidRequest { message: message.into() }
    }

    /// Errors caused by the caller's input rather than by the gateway
    pub fn is_client_error(&self) -> bool {
        matches!(self, SharedError::InvalidRequest { .. } | SharedError::InvalidJobId { .. })
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
