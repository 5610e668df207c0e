//! HTTP surface of the secure computation gateway
//!
//! Exposes the admission endpoints, the polling endpoint and a health check
//! on top of any [`orchestrator::JobGateway`].

pub mod error;
pub mod state;
pub mod types;
pub mod webserver_impl;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::WebServerState;
pub use types::*;
pub use webserver_impl::WebServer;
