//! Test helper utilities for webserver integration tests

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tower::ServiceExt;

use orchestrator::{DeploymentMode, JobGateway};
use webserver::{WebServer, WebServerState};

/// Response status, content type and raw body
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub fn test_address() -> SocketAddr {
    "127.0.0.1:3000".parse().unwrap()
}

/// Router over `gateway` without binding a socket
pub fn router_for<G: JobGateway + 'static>(gateway: G, mode: DeploymentMode) -> Router {
    WebServer::new(WebServerState::new(test_address(), mode), gateway).build_router()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

pub fn post_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Drive one request through the router in-process
pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    TestResponse {
        status,
        content_type,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Poll `location` until the job leaves the running state
pub async fn wait_for_terminal(router: &Router, location: &str) -> Value {
    for _ in 0..200 {
        let response = send(router, get(location)).await;
        assert_eq!(response.status, StatusCode::OK);
        let view = response.json();
        if view["status"] == "succeeded" || view["status"] == "failed" {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job at {location} did not finish in time");
}
