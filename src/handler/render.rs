//! Render adapter
//!
//! Turns a front-door request into the generic request the SSR handler
//! expects, invokes it, and writes its result back as an HTTP response.

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::render::{BodyStream, RenderBody, RenderEntry, RenderError, RenderResult, RouterContext};
use bytes::BytesMut;
use futures::TryStreamExt;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use std::fmt::Display;
use std::sync::Arc;

/// Render a request through the configured entry point
pub async fn render_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    let handler = match &state.entry {
        RenderEntry::StaticFallback => {
            let is_head = req.method() == Method::HEAD;
            return http::build_html_response(state.fallback_page.clone(), is_head);
        }
        RenderEntry::Ssr(handler) => Arc::clone(handler),
    };

    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => return failure(&format!("failed to read request body: {e}")),
    };

    let context = RouterContext {
        url: parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), ToString::to_string),
        is_spa_mode: handler.is_spa_mode(),
    };

    let request = match to_render_request(&parts, body) {
        Ok(request) => request,
        Err(e) => return failure(&format!("invalid request: {e}")),
    };

    match handler
        .render(request, StatusCode::OK, HeaderMap::new(), context)
        .await
    {
        Ok(Some(result)) => write_result(result).await,
        Ok(None) => failure("SSR handler returned no response"),
        Err(e) => failure(&e.to_string()),
    }
}

/// Build the generic request: absolute URL, flattened headers, full body
pub fn to_render_request(parts: &Parts, body: Bytes) -> Result<Request<Bytes>, hyper::http::Error> {
    let host = parts
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or("/", |pq| pq.as_str());

    let mut request = Request::builder()
        .method(parts.method.clone())
        .uri(format!("http://{host}{path_and_query}"))
        .version(parts.version)
        .body(body)?;
    *request.headers_mut() = flatten_headers(&parts.headers);
    Ok(request)
}

/// Collapse repeated headers into one comma-joined value per name
pub fn flatten_headers(headers: &HeaderMap) -> HeaderMap {
    let mut flat = HeaderMap::with_capacity(headers.keys_len());
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(HeaderValue::as_bytes)
            .collect::<Vec<_>>()
            .join(&b", "[..]);
        if let Ok(value) = HeaderValue::from_bytes(&joined) {
            flat.insert(name.clone(), value);
        }
    }
    flat
}

async fn write_result(result: RenderResult) -> Response<Full<Bytes>> {
    let RenderResult {
        status,
        mut headers,
        body,
    } = result;

    let body = match body {
        None => Bytes::new(),
        Some(RenderBody::Text(text)) => Bytes::from(text),
        Some(RenderBody::Stream(stream)) => match drain(stream).await {
            Ok(bytes) => bytes,
            Err(e) => return failure(&e.to_string()),
        },
    };

    // Framing is recomputed for the buffered body
    headers.remove(CONTENT_LENGTH);
    headers.remove(TRANSFER_ENCODING);

    let mut resp = Response::new(Full::new(body));
    *resp.status_mut() = status;
    *resp.headers_mut() = headers;
    resp
}

/// Read a streaming body to the end. Buffers everything in memory.
async fn drain(mut stream: BodyStream) -> Result<Bytes, RenderError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.try_next().await? {
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

fn failure(message: &str) -> Response<Full<Bytes>> {
    logger::log_render_failure(StatusCode::INTERNAL_SERVER_ERROR, message);
    http::build_500_response(message)
}
