//! Serve a server-side-rendered web application from AWS Lambda.
//!
//! Every API Gateway proxy event is replayed as a real HTTP request against
//! an in-process front door (static files first, then the [`SsrHandler`]),
//! and the captured response is returned to the Lambda runtime. Outside
//! production the same front door also runs as a long-lived local server.

pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod http;
pub mod invocation;
pub mod lambda;
pub mod logger;
pub mod render;
pub mod server;

pub use config::{AppState, Config};
pub use error::AdapterError;
pub use event::{InboundEvent, OutboundResponse};
pub use invocation::Invocation;
pub use render::{RenderEntry, RenderError, RenderResult, RouterContext, SsrHandler};

use std::sync::Arc;

/// Boxed error returned by the process entry points
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run the adapter with `entry` as the render entry.
///
/// Outside production the development server listens on
/// `server.host:server.port`. When started by the Lambda runtime, events are
/// handled until the runtime stops the process. Production mode outside
/// Lambda has nothing to serve and fails at startup.
pub async fn run(config: Config, entry: RenderEntry) -> Result<(), BoxError> {
    let on_lambda = lambda::is_running_on_lambda();
    let production = config.server.is_production();

    if production && !on_lambda {
        return Err("production mode requires the Lambda runtime (AWS_LAMBDA_RUNTIME_API is not set)".into());
    }

    let state = Arc::new(AppState::new(config, entry));

    let dev_server = if production {
        None
    } else {
        let addr = state.config.get_socket_addr()?;
        let listener = server::create_listener(addr, true)?;
        logger::log_server_start(&addr, &state.config);
        Some(tokio::spawn(server::run_dev_server(
            listener,
            Arc::clone(&state),
            server::signal::shutdown_signal(),
        )))
    };

    if on_lambda {
        return lambda::run(state).await;
    }

    if let Some(handle) = dev_server {
        handle.await?;
    }
    Ok(())
}
