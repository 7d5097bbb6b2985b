//! Invocation adapter
//!
//! One Lambda event becomes one real HTTP exchange: the front door is bound
//! on an ephemeral loopback port, accepts a single connection, and is torn
//! down once the response has been read back. A wall-clock timeout bounds
//! the whole exchange.

use http_body_util::BodyExt;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::config::AppState;
use crate::error::AdapterError;
use crate::event::{InboundEvent, OutboundResponse};
use crate::logger;
use crate::server::{connection, create_listener};

/// A front door bound for exactly one invocation
pub struct Invocation {
    listener: TcpListener,
    addr: SocketAddr,
    state: Arc<AppState>,
    timeout: Duration,
}

impl Invocation {
    /// Bind the ephemeral listener.
    pub fn bind(state: Arc<AppState>) -> Result<Self, AdapterError> {
        let bind_addr = state
            .config
            .get_invocation_addr()
            .map_err(AdapterError::InvalidEvent)?;
        let listener = create_listener(bind_addr, false).map_err(AdapterError::Bind)?;
        let addr = listener.local_addr().map_err(AdapterError::Bind)?;
        let timeout = state.config.invocation_timeout();

        Ok(Self {
            listener,
            addr,
            state,
            timeout,
        })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Replace the configured timeout for this invocation
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `event` through the front door.
    ///
    /// Adapter failures become a 500 response. Only a timeout is returned as
    /// an error. The listener is closed before this returns either way.
    pub async fn dispatch(self, event: InboundEvent) -> Result<OutboundResponse, AdapterError> {
        let Self {
            listener,
            addr,
            state,
            timeout,
        } = self;
        let started = Instant::now();

        let server = tokio::spawn(serve_once(listener, state));
        logger::log_invocation_ready(&addr);

        let outcome = tokio::time::timeout(timeout, round_trip(addr, &event)).await;

        // The response has been read in full (or abandoned): drop the listener
        close(server).await;

        match outcome {
            Ok(Ok(response)) => {
                logger::log_invocation_complete(response.status_code, started.elapsed());
                Ok(response)
            }
            Ok(Err(e)) => {
                logger::log_error(&format!("Invocation failed: {e}"));
                Ok(OutboundResponse::internal_error(&e.to_string()))
            }
            Err(_) => {
                logger::log_invocation_timeout(timeout);
                Err(AdapterError::Timeout(timeout))
            }
        }
    }
}

/// Accept one connection and serve it without keep-alive
async fn serve_once(listener: TcpListener, state: Arc<AppState>) {
    match listener.accept().await {
        Ok((stream, peer_addr)) => {
            drop(listener);
            if let Err(e) = connection::serve_connection(stream, peer_addr, state, false).await {
                logger::log_connection_error(&e);
            }
        }
        Err(e) => logger::log_error(&format!("Failed to accept invocation connection: {e}")),
    }
}

async fn close(server: JoinHandle<()>) {
    server.abort();
    if let Err(e) = server.await {
        if !e.is_cancelled() {
            logger::log_error(&format!("Invocation server task failed: {e}"));
        }
    }
}

/// Send the event as an HTTP request and read the whole response
async fn round_trip(addr: SocketAddr, event: &InboundEvent) -> Result<OutboundResponse, AdapterError> {
    let request = event.to_http_request(addr)?;

    let stream = TcpStream::connect(addr).await.map_err(AdapterError::Connect)?;
    let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await?;
    let driver = tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("Invocation client connection closed: {e}");
        }
    });

    let response = sender.send_request(request).await?;
    let (parts, body) = response.into_parts();
    let body = body.collect().await?.to_bytes();

    drop(sender);
    driver.abort();

    Ok(OutboundResponse::from_parts(&parts, &body))
}
