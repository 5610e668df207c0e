//! Shared logging utilities for consistent tracing across the gateway

use crate::types::NodeRole;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Filter directives for the gateway's own crates at the given base level
fn filter_directives(base_level: &str) -> String {
    format!(
        "webserver={base_level},orchestrator={base_level},shared={base_level},tower_http=warn,hyper=warn,reqwest=warn"
    )
}

/// Initialize tracing subscriber with an optional log level
///
/// `RUST_LOG` takes precedence over the computed directives when set.
pub fn init_tracing_with_level(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let base_level = log_level.unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(base_level)));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for node-aware info logging
#[macro_export]
macro_rules! node_info {
    ($($arg:tt)*) => {
        tracing::info!(
            node = %$crate::NodeRole::current(),
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for node-aware warning logging
#[macro_export]
macro_rules! node_warn {
    ($($arg:tt)*) => {
        tracing::warn!(
            node = %$crate::NodeRole::current(),
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for node-aware error logging
#[macro_export]
macro_rules! node_error {
    ($($arg:tt)*) => {
        tracing::error!(
            node = %$crate::NodeRole::current(),
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for node-aware debug logging
#[macro_export]
macro_rules! node_debug {
    ($($arg:tt)*) => {
        tracing::debug!(
            node = %$crate::NodeRole::current(),
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(role: &NodeRole, details: &str) {
    info!(
        node = %role,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(role: &NodeRole, reason: &str) {
    info!(
        node = %role,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(role: &NodeRole, context: &str, error: &dyn std::fmt::Display) {
    error!(
        node = %role,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(role: &NodeRole, message: &str) {
    info!(
        node = %role,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}

/// Contextual logging helper for progress updates
pub fn log_progress(role: &NodeRole, action: &str, details: &str) {
    info!(
        node = %role,
        timestamp = format_timestamp(),
        "📋 {}: {}",
        action,
        details
    );
}
