//! Webserver state management

use std::net::SocketAddr;
use std::time::Instant;

use orchestrator::DeploymentMode;

/// Process-level facts reported by the health endpoint
#[derive(Debug)]
pub struct WebServerState {
    pub bind_address: SocketAddr,
    pub mode: DeploymentMode,
    pub server_start_time: Instant,
}

impl WebServerState {
    pub fn new(bind_address: SocketAddr, mode: DeploymentMode) -> Self {
        Self {
            bind_address,
            mode,
            server_start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn get_uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }

    pub fn is_simulation(&self) -> bool {
        self.mode.is_simulation()
    }
}
