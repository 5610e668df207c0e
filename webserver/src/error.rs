//! WebServer-specific error types and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use orchestrator::OrchestratorError;
use shared::{node_error, SharedError};

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    SharedError(#[from] SharedError),

    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WebServerError {
    pub fn invalid_request(details: impl Into<String>) -> Self {
        WebServerError::InvalidRequest { details: details.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        let client_error = match self {
            WebServerError::InvalidRequest { .. } => true,
            WebServerError::Orchestrator(e) => e.is_validation(),
            WebServerError::SharedError(e) => e.is_client_error(),
            _ => false,
        };

        if client_error {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for WebServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            node_error!(error = %self, "Request failed");
        }

        let body = json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

pub type WebServerResult<T> = Result<T, WebServerError>;
