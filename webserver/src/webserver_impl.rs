//! Main webserver implementation
//!
//! The HTTP surface is a thin adapter: every admission endpoint hands the
//! raw body to the injected [`JobGateway`] and translates its [`Admission`]
//! into a response, while the polling endpoint reads the job ledger through
//! the same gateway.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use orchestrator::config::QUEUE_PATH;
use orchestrator::{Admission, JobGateway};
use shared::{logging, node_info, AlgorithmFamily, JobId, JobView, NodeRole};

use crate::error::{WebServerError, WebServerResult};
use crate::state::WebServerState;
use crate::types::{HealthResponse, LocationResponse, QueueQuery};

/// Main webserver struct with the gateway injected
pub struct WebServer<G>
where
    G: JobGateway + 'static,
{
    state: Arc<WebServerState>,
    gateway: Arc<G>,
}

impl<G> Clone for WebServer<G>
where
    G: JobGateway + 'static,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G> WebServer<G>
where
    G: JobGateway + 'static,
{
    pub fn new(state: WebServerState, gateway: G) -> Self {
        Self {
            state: Arc::new(state),
            gateway: Arc::new(gateway),
        }
    }

    pub fn state(&self) -> &WebServerState {
        &self.state
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            // Admission, one endpoint per algorithm family
            .route("/smpc/histogram", post(histogram_handler::<G>))
            .route("/smpc/count", post(count_handler::<G>))
            .route("/smpc/decision_tree", post(decision_tree_handler::<G>))
            // Polling
            .route(QUEUE_PATH, get(queue_handler::<G>))
            .route("/health", get(health_check::<G>))
            .layer(ServiceBuilder::new().layer(CorsLayer::permissive()).into_inner())
            .with_state(self.clone())
    }

    /// Serve until Ctrl+C
    pub async fn run(&self) -> WebServerResult<()> {
        let router = self.build_router();
        let address = self.state.bind_address;

        let listener = tokio::net::TcpListener::bind(address)
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("Failed to bind to {address}: {e}")))?;

        node_info!(
            address = %address,
            simulation = self.state.is_simulation(),
            "Gateway listening on http://{}",
            address
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        logging::log_success(NodeRole::current(), "Gateway stopped gracefully");
        Ok(())
    }

    /// Hand a raw body to the gateway and render the admission
    async fn admit(&self, family: AlgorithmFamily, body: &[u8]) -> WebServerResult<Response> {
        let body: Value = serde_json::from_slice(body)
            .map_err(|e| WebServerError::invalid_request(format!("request body is not valid JSON: {e}")))?;

        match self.gateway.submit(family, body).await? {
            Admission::Accepted { location, .. } => {
                Ok((StatusCode::ACCEPTED, Json(LocationResponse { location })).into_response())
            }
            Admission::Delivered { body, .. } => Ok((StatusCode::OK, body).into_response()),
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logging::log_shutdown(NodeRole::current(), "Received Ctrl+C signal"),
        Err(err) => {
            logging::log_error(NodeRole::current(), "Signal handling", &err);
            // Keep serving without a shutdown trigger
            std::future::pending::<()>().await;
        }
    }
}

async fn histogram_handler<G>(State(server): State<WebServer<G>>, body: Bytes) -> WebServerResult<Response>
where
    G: JobGateway + 'static,
{
    server.admit(AlgorithmFamily::Histogram, &body).await
}

async fn count_handler<G>(State(server): State<WebServer<G>>, body: Bytes) -> WebServerResult<Response>
where
    G: JobGateway + 'static,
{
    server.admit(AlgorithmFamily::Count, &body).await
}

async fn decision_tree_handler<G>(State(server): State<WebServer<G>>, body: Bytes) -> WebServerResult<Response>
where
    G: JobGateway + 'static,
{
    server.admit(AlgorithmFamily::DecisionTree, &body).await
}

async fn queue_handler<G>(
    State(server): State<WebServer<G>>,
    Query(query): Query<QueueQuery>,
) -> WebServerResult<Json<JobView>>
where
    G: JobGateway + 'static,
{
    let raw = query
        .request
        .ok_or_else(|| WebServerError::invalid_request("missing 'request' query parameter"))?;
    let job_id = JobId::from_string(&raw)?;

    let record = server.gateway.poll(&job_id).await?;
    Ok(Json(JobView::from(record)))
}

async fn health_check<G>(State(server): State<WebServer<G>>) -> Json<HealthResponse>
where
    G: JobGateway + 'static,
{
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: server.state.get_uptime_seconds(),
        simulation: server.state.is_simulation(),
        duplicate_computations: server.gateway.duplicate_computations(),
    })
}
