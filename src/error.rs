//! Error types for the invocation adapter.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while bridging one invocation.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// No response was produced within the invocation budget.
    #[error("Server timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The ephemeral listener could not be bound.
    #[error("Failed to bind local listener: {0}")]
    Bind(#[source] std::io::Error),

    /// The client side could not reach the local listener.
    #[error("Failed to connect to local listener: {0}")]
    Connect(#[source] std::io::Error),

    /// The event cannot be expressed as an HTTP request.
    #[error("Invalid inbound event: {0}")]
    InvalidEvent(String),

    /// The HTTP exchange with the front door failed.
    #[error("HTTP exchange failed: {0}")]
    Http(#[from] hyper::Error),
}

impl From<hyper::http::Error> for AdapterError {
    fn from(err: hyper::http::Error) -> Self {
        Self::InvalidEvent(err.to_string())
    }
}
