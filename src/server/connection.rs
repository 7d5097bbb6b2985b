// Connection handling module
// Serves one TCP connection with the front door service

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Serve HTTP/1.1 on `stream` until the peer or the server closes it.
///
/// With `keep_alive` off the server closes the connection after the first
/// response, which is what a single invocation relies on.
pub async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    keep_alive: bool,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);

    let mut builder = http1::Builder::new();
    builder.keep_alive(keep_alive);

    builder
        .serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
        )
        .await
}

/// Handle a development-server connection in a spawned task.
///
/// Applies the configured connection timeout and logs failures.
pub fn spawn_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let keep_alive = state.config.server.keep_alive;
        let timeout_duration = Duration::from_secs(state.config.server.connection_timeout);

        let conn = serve_connection(stream, peer_addr, state, keep_alive);
        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }
    });
}
