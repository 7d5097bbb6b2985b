//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: static file lookup, body size
//! validation, then the render step.

use crate::config::AppState;
use crate::handler::{render, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context for the static file lookup
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let started = Instant::now();
    logger::log_request(req.method(), req.uri(), req.version());

    let entry = state
        .config
        .logging
        .access_log
        .then(|| start_access_entry(&req, peer_addr));

    let (response, served_by) = route_request(req, &state).await;

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.served_by = served_by;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request: static assets for GET/HEAD, the render step otherwise
async fn route_request<B>(req: Request<B>, state: &AppState) -> (Response<Full<Bytes>>, &'static str)
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let static_cfg = &state.config.static_files;
    if static_cfg.enabled && matches!(*req.method(), Method::GET | Method::HEAD) {
        let path = req.uri().path().to_string();
        let ctx = RequestContext {
            path: &path,
            is_head: req.method() == Method::HEAD,
            if_none_match: header_string(&req, IF_NONE_MATCH),
        };
        if let Some(resp) = static_files::serve_static(&ctx, static_cfg).await {
            return (resp, "static");
        }
    }

    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return (resp, "render");
    }

    (render::render_request(req, state).await, "render")
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn start_access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    // Behind API Gateway the socket peer is the loopback client
    let remote_addr = header_string(req, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|hop| hop.trim().to_string()))
        .filter(|hop| !hop.is_empty())
        .unwrap_or_else(|| peer_addr.ip().to_string());

    let mut entry = AccessLogEntry::new(
        remote_addr,
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header_string(req, REFERER);
    entry.user_agent = header_string(req, USER_AGENT);
    entry
}

fn header_string<B>(req: &Request<B>, name: impl hyper::header::AsHeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::render::RenderEntry;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn fallback_state(static_dir: &std::path::Path) -> Arc<AppState> {
        let mut cfg = Config::default();
        cfg.static_files.dir = static_dir.display().to_string();
        cfg.http.max_body_size = 16;
        Arc::new(AppState::new(cfg, RenderEntry::StaticFallback))
    }

    async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> (StatusCode, String) {
        let resp = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn request(method: Method, uri: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_static_file_wins_over_render() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("robots.txt"), "User-agent: *").unwrap();
        let state = fallback_state(dir.path());

        let (status, body) = send(&state, request(Method::GET, "/robots.txt")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "User-agent: *");
    }

    #[tokio::test]
    async fn test_post_to_static_path_goes_to_render() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("robots.txt"), "User-agent: *").unwrap();
        let state = fallback_state(dir.path());

        let (status, body) = send(&state, request(Method::POST, "/robots.txt")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, state.fallback_page);
    }

    #[tokio::test]
    async fn test_fallback_for_any_path_and_method() {
        let dir = tempfile::tempdir().unwrap();
        let state = fallback_state(dir.path());

        for (method, uri) in [
            (Method::GET, "/"),
            (Method::GET, "/products/42?color=red"),
            (Method::POST, "/cart"),
            (Method::DELETE, "/session"),
        ] {
            let (status, body) = send(&state, request(method, uri)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, state.fallback_page);
        }
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = fallback_state(dir.path());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(CONTENT_LENGTH, "1024")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let (status, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_access_entry_prefers_forwarded_for() {
        let req = Request::builder()
            .uri("/a?b=c")
            .header("x-forwarded-for", "198.51.100.4, 10.0.0.1")
            .header(USER_AGENT, "curl/8.0")
            .body(())
            .unwrap();
        let entry = start_access_entry(&req, peer());
        assert_eq!(entry.remote_addr, "198.51.100.4");
        assert_eq!(entry.query.as_deref(), Some("b=c"));
        assert_eq!(entry.http_version, "1.1");
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));

        let bare = Request::builder().uri("/").body(()).unwrap();
        assert_eq!(start_access_entry(&bare, peer()).remote_addr, "127.0.0.1");
    }
}
