//! Lambda proxy event and response shapes
//!
//! The inbound event is the API Gateway REST proxy payload reduced to the
//! fields the adapter reads. The outbound response is what API Gateway
//! expects back from a proxy integration.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderName, HeaderValue, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, HOST, TRANSFER_ENCODING};
use hyper::http::response::Parts;
use hyper::{Method, Request, StatusCode};
use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::AdapterError;
use crate::logger;

/// Characters `encodeURIComponent` leaves untouched besides alphanumerics
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Characters a raw event path cannot carry into a request target
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Hop-by-hop headers belong to the loopback connection, not the reply
fn is_hop_by_hop(name: &HeaderName) -> bool {
    *name == CONNECTION || *name == TRANSFER_ENCODING || name.as_str() == "keep-alive"
}

/// Inbound proxy event
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub headers: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl InboundEvent {
    /// Path plus query string, e.g. `/search?q=rust%20lang&page=2`.
    ///
    /// Values are encoded the way `encodeURIComponent` does. Keys are kept as
    /// they arrive apart from characters a request target cannot carry.
    pub fn request_uri(&self) -> String {
        let path = self.path.as_deref().filter(|p| !p.is_empty()).unwrap_or("/");
        let mut uri = utf8_percent_encode(path, PATH).to_string();
        if let Some(params) = &self.query_string_parameters {
            let query = params
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{}={}",
                        utf8_percent_encode(key, PATH),
                        utf8_percent_encode(value, COMPONENT)
                    )
                })
                .collect::<Vec<_>>()
                .join("&");
            uri.push('?');
            uri.push_str(&query);
        }
        uri
    }

    pub fn method(&self) -> Result<Method, AdapterError> {
        match self.http_method.as_deref() {
            None | Some("") => Ok(Method::GET),
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|e| AdapterError::InvalidEvent(format!("method '{m}': {e}"))),
        }
    }

    /// Build the HTTP request sent to the front door listening on `addr`.
    ///
    /// Headers with names or values HTTP cannot carry are dropped with a
    /// warning. A missing `Host` header is filled in with `addr`.
    pub fn to_http_request(&self, addr: SocketAddr) -> Result<Request<Full<Bytes>>, AdapterError> {
        let mut request = Request::builder()
            .method(self.method()?)
            .uri(self.request_uri())
            .body(Full::new(Bytes::from(self.body.clone().unwrap_or_default())))?;

        let headers = request.headers_mut();
        for (name, value) in self.headers.iter().flatten() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                // Framing is derived from the body actually sent
                (Ok(name), Ok(value)) if !is_hop_by_hop(&name) && name != CONTENT_LENGTH => {
                    headers.insert(name, value);
                }
                (Ok(_), Ok(_)) => {}
                _ => logger::log_warning(&format!("Dropping unrepresentable header '{name}'")),
            }
        }
        if !headers.contains_key(HOST) {
            let host = HeaderValue::from_str(&addr.to_string())
                .map_err(|e| AdapterError::InvalidEvent(e.to_string()))?;
            headers.insert(HOST, host);
        }

        Ok(request)
    }
}

/// Outbound proxy response
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundResponse {
    pub status_code: u16,
    pub headers: IndexMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl OutboundResponse {
    /// Capture a front-door response. Repeated headers are comma-joined.
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        let mut headers: IndexMap<String, String> = IndexMap::new();
        for (name, value) in &parts.headers {
            if is_hop_by_hop(name) {
                continue;
            }
            let value = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }

        Self {
            status_code: parts.status.as_u16(),
            headers,
            body: String::from_utf8_lossy(body).into_owned(),
            is_base64_encoded: false,
        }
    }

    /// Plain-text 500 reply used when the adapter itself fails
    pub fn internal_error(message: &str) -> Self {
        let mut headers = IndexMap::new();
        headers.insert(CONTENT_TYPE.as_str().to_string(), "text/plain".to_string());
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            headers,
            body: format!("Internal Server Error: {message}"),
            is_base64_encoded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Response;
    use serde_json::json;

    fn event_with_query(pairs: &[(&str, &str)]) -> InboundEvent {
        InboundEvent {
            path: Some("/search".to_string()),
            query_string_parameters: Some(
                pairs
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ),
            ..InboundEvent::default()
        }
    }

    #[test]
    fn test_uri_without_query_parameters() {
        let event = InboundEvent {
            path: Some("/products/42".to_string()),
            ..InboundEvent::default()
        };
        assert_eq!(event.request_uri(), "/products/42");
        assert_eq!(InboundEvent::default().request_uri(), "/");

        let spaced = InboundEvent {
            path: Some("/blog/hello world".to_string()),
            ..InboundEvent::default()
        };
        assert_eq!(spaced.request_uri(), "/blog/hello%20world");
    }

    #[test]
    fn test_uri_encodes_values_and_joins_pairs() {
        let event = event_with_query(&[("q", "rust lang"), ("page", "2"), ("tag", "a&b=c/d")]);
        assert_eq!(
            event.request_uri(),
            "/search?q=rust%20lang&page=2&tag=a%26b%3Dc%2Fd"
        );
    }

    #[test]
    fn test_uri_keeps_component_safe_characters() {
        let event = event_with_query(&[("v", "a-b_c.d!e~f*g'h(i)"), ("u", "ü")]);
        assert_eq!(event.request_uri(), "/search?v=a-b_c.d!e~f*g'h(i)&u=%C3%BC");
    }

    #[test]
    fn test_deserialize_api_gateway_event() {
        let event: InboundEvent = serde_json::from_value(json!({
            "resource": "/{proxy+}",
            "path": "/about",
            "httpMethod": "POST",
            "headers": {"Host": "example.com", "Accept": "text/html"},
            "queryStringParameters": null,
            "body": "name=value",
            "isBase64Encoded": false
        }))
        .unwrap();

        assert_eq!(event.path.as_deref(), Some("/about"));
        assert_eq!(event.method().unwrap(), Method::POST);
        assert!(event.query_string_parameters.is_none());
        assert_eq!(event.request_uri(), "/about");
        assert_eq!(event.body.as_deref(), Some("name=value"));
    }

    #[test]
    fn test_method_defaults_and_validation() {
        assert_eq!(InboundEvent::default().method().unwrap(), Method::GET);
        let lower = InboundEvent {
            http_method: Some("put".to_string()),
            ..InboundEvent::default()
        };
        assert_eq!(lower.method().unwrap(), Method::PUT);
        let bad = InboundEvent {
            http_method: Some("BAD METHOD".to_string()),
            ..InboundEvent::default()
        };
        assert!(matches!(bad.method(), Err(AdapterError::InvalidEvent(_))));
    }

    #[test]
    fn test_http_request_fills_host() {
        let addr: SocketAddr = "127.0.0.1:4321".parse().unwrap();
        let request = InboundEvent::default().to_http_request(addr).unwrap();
        assert_eq!(request.headers()[HOST], "127.0.0.1:4321");
        assert_eq!(request.uri(), "/");

        let mut headers = IndexMap::new();
        headers.insert("Host".to_string(), "example.com".to_string());
        headers.insert("bad header".to_string(), "x".to_string());
        headers.insert("Connection".to_string(), "keep-alive".to_string());
        let event = InboundEvent {
            headers: Some(headers),
            ..InboundEvent::default()
        };
        let request = event.to_http_request(addr).unwrap();
        assert_eq!(request.headers()[HOST], "example.com");
        assert!(!request.headers().contains_key(CONNECTION));
        assert_eq!(request.headers().len(), 1);
    }

    #[test]
    fn test_outbound_from_parts() {
        let response = Response::builder()
            .status(201)
            .header("content-type", "text/html")
            .header("vary", "accept")
            .header("vary", "cookie")
            .header("connection", "close")
            .body(())
            .unwrap();
        let (parts, ()) = response.into_parts();
        let out = OutboundResponse::from_parts(&parts, b"<p>hi</p>");

        assert_eq!(out.status_code, 201);
        assert_eq!(out.headers["content-type"], "text/html");
        assert_eq!(out.headers["vary"], "accept, cookie");
        assert!(!out.headers.contains_key("connection"));
        assert_eq!(out.body, "<p>hi</p>");
        assert!(!out.is_base64_encoded);
    }

    #[test]
    fn test_outbound_serializes_proxy_shape() {
        let value = serde_json::to_value(OutboundResponse::internal_error("boom")).unwrap();
        assert_eq!(value["statusCode"], 500);
        assert_eq!(value["isBase64Encoded"], false);
        assert_eq!(value["body"], "Internal Server Error: boom");
        assert_eq!(value["headers"]["content-type"], "text/plain");
    }
}
