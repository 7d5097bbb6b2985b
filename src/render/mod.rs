//! Render entry point
//!
//! The SSR engine is an external collaborator. It plugs in through the
//! [`SsrHandler`] trait; a deployment without one runs in fallback mode and
//! serves the static page from [`fallback`].

pub mod fallback;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use hyper::{HeaderMap, Request, StatusCode};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Byte stream produced by a streaming render.
pub type BodyStream = BoxStream<'static, Result<Bytes, RenderError>>;

/// Errors reported by an SSR handler.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The handler failed before producing a result.
    #[error("{0}")]
    Handler(String),

    /// The result body stream failed while being drained.
    #[error("body stream failed: {0}")]
    Stream(String),
}

impl RenderError {
    pub fn handler(message: impl fmt::Display) -> Self {
        Self::Handler(message.to_string())
    }

    pub fn stream(message: impl fmt::Display) -> Self {
        Self::Stream(message.to_string())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        Self::Stream(err.to_string())
    }
}

/// Routing context handed to the SSR handler alongside the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterContext {
    /// Request path plus query string, as received by the front door
    pub url: String,
    /// Client renders everything, server only ships the shell
    pub is_spa_mode: bool,
}

/// Body of a render result
pub enum RenderBody {
    Text(String),
    Stream(BodyStream),
}

impl fmt::Debug for RenderBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Response-like value returned by the SSR handler
#[derive(Debug)]
pub struct RenderResult {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<RenderBody>,
}

impl Default for RenderResult {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RenderResult {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RenderBody::Text(body.into()));
        self
    }

    #[must_use]
    pub fn with_stream(mut self, stream: BodyStream) -> Self {
        self.body = Some(RenderBody::Stream(stream));
        self
    }
}

/// The one entry-point signature a render bundle exposes.
#[async_trait]
pub trait SsrHandler: Send + Sync {
    /// Render `request`. `status` and `headers` are the defaults the handler
    /// starts from. `Ok(None)` means the handler produced nothing.
    async fn render(
        &self,
        request: Request<Bytes>,
        status: StatusCode,
        headers: HeaderMap,
        context: RouterContext,
    ) -> Result<Option<RenderResult>, RenderError>;

    fn is_spa_mode(&self) -> bool {
        false
    }
}

/// Configured render entry point
#[derive(Clone, Default)]
pub enum RenderEntry {
    Ssr(Arc<dyn SsrHandler>),
    /// No handler configured: every request gets the fallback page
    #[default]
    StaticFallback,
}

impl RenderEntry {
    pub fn ssr(handler: impl SsrHandler + 'static) -> Self {
        Self::Ssr(Arc::new(handler))
    }

    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::StaticFallback)
    }
}

impl fmt::Debug for RenderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssr(_) => f.write_str("Ssr(..)"),
            Self::StaticFallback => f.write_str("StaticFallback"),
        }
    }
}
