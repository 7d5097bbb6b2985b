//! Logger module
//!
//! Provides logging utilities for the adapter including:
//! - Subscriber setup driven by configuration
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use hyper::{Method, StatusCode, Uri, Version};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
///
/// Should be called once at application startup. `RUST_LOG` takes
/// precedence over `logging.level`.
pub fn init(config: &Config, ansi: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(false)
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        %addr,
        mode = %config.server.mode,
        static_dir = %config.static_files.dir,
        "Development server listening on http://{addr}"
    );
}

pub fn log_server_stop() {
    tracing::info!("Development server stopped");
}

pub fn log_lambda_start(config: &Config) {
    tracing::info!(
        timeout_ms = config.invocation.timeout_ms,
        "Lambda runtime started"
    );
}

pub fn log_invocation_event(event: &impl std::fmt::Debug) {
    tracing::debug!(?event, "Lambda event");
}

pub fn log_invocation_ready(addr: &SocketAddr) {
    tracing::debug!(%addr, "Server is ready to handle requests");
}

pub fn log_invocation_complete(status: u16, elapsed: Duration) {
    tracing::info!(
        status,
        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        "Response completed with status: {status}"
    );
}

pub fn log_invocation_timeout(timeout: Duration) {
    tracing::error!(
        timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        "Server timeout"
    );
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    tracing::debug!(%method, %uri, ?version, "Handling request");
}

pub fn log_render_failure(status: StatusCode, message: &str) {
    tracing::error!(status = status.as_u16(), "Error in SSR handler: {message}");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}
