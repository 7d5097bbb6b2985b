//! Lambda runtime entry
//!
//! Each event gets a fresh [`Invocation`]: nothing is shared between
//! invocations except the loaded configuration and render entry.

use lambda_runtime::{service_fn, Error, LambdaEvent};
use std::sync::Arc;

use crate::config::AppState;
use crate::error::AdapterError;
use crate::event::{InboundEvent, OutboundResponse};
use crate::invocation::Invocation;
use crate::logger;

/// Whether the process was started by the Lambda runtime
pub fn is_running_on_lambda() -> bool {
    std::env::var_os("AWS_LAMBDA_RUNTIME_API").is_some()
}

/// Bridge one proxy event to the front door and back.
///
/// Resolves with the captured response, or fails with
/// [`AdapterError::Timeout`] when the invocation budget runs out.
pub async fn handle_event(
    event: InboundEvent,
    state: Arc<AppState>,
) -> Result<OutboundResponse, AdapterError> {
    logger::log_invocation_event(&event);

    let invocation = match Invocation::bind(state) {
        Ok(invocation) => invocation,
        Err(e) => {
            logger::log_error(&format!("Failed to start server: {e}"));
            return Ok(OutboundResponse::internal_error(&e.to_string()));
        }
    };

    invocation.dispatch(event).await
}

/// Poll the Lambda runtime API until the process is stopped
pub async fn run(state: Arc<AppState>) -> Result<(), Error> {
    logger::log_lambda_start(&state.config);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<InboundEvent>| {
        let state = Arc::clone(&state);
        async move {
            handle_event(event.payload, state)
                .await
                .map_err(Error::from)
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::render::RenderEntry;
    use serde_json::json;

    fn state() -> Arc<AppState> {
        let mut cfg = Config::default();
        cfg.static_files.enabled = false;
        Arc::new(AppState::new(cfg, RenderEntry::StaticFallback))
    }

    #[tokio::test]
    async fn test_handle_proxy_event_json() {
        let event: InboundEvent = serde_json::from_value(json!({
            "resource": "/{proxy+}",
            "path": "/products/42",
            "httpMethod": "GET",
            "headers": { "Accept": "text/html", "Host": "example.com" },
            "queryStringParameters": { "ref": "home page" },
            "requestContext": { "stage": "prod" },
            "body": null,
            "isBase64Encoded": false
        }))
        .unwrap();

        let state = state();
        let response = handle_event(event, Arc::clone(&state)).await.unwrap();

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["isBase64Encoded"], false);
        assert_eq!(value["body"], state.fallback_page.as_str());
        assert_eq!(value["headers"]["content-type"], "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn test_empty_event_defaults_to_root() {
        let event: InboundEvent = serde_json::from_value(json!({})).unwrap();
        let response = handle_event(event, state()).await.unwrap();
        assert_eq!(response.status_code, 200);
    }

    #[tokio::test]
    async fn test_invocations_are_independent() {
        let state = state();
        let (a, b) = tokio::join!(
            handle_event(InboundEvent::default(), Arc::clone(&state)),
            handle_event(InboundEvent::default(), Arc::clone(&state)),
        );
        assert_eq!(a.unwrap().status_code, 200);
        assert_eq!(b.unwrap().status_code, 200);
    }
}
