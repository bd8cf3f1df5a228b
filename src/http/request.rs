//! Request values flowing through the relay.
//!
//! # Responsibilities
//! - Capture the inbound request (method, path, raw query, headers, body)
//! - Build the outbound request aimed at the backend
//!
//! # Design Decisions
//! - The body is fully buffered; it may be needed once and forwarded verbatim
//! - The raw query string is kept so untouched queries reach the backend
//!   exactly as the caller encoded them

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use url::Url;

use crate::error::{RelayError, RelayResult};
use crate::security::sanitize_request_headers;

/// A request as received on the relay's catch-all route.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Remainder of the path after the mount point, without leading `/`.
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A request about to be sent to the backend.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OutboundRequest {
    /// Aim `inbound` at `{backend}/{path}` with sanitized headers.
    pub fn from_inbound(backend: &Url, inbound: InboundRequest) -> RelayResult<Self> {
        let mut url = backend_target(backend, &inbound.path)?;
        url.set_query(inbound.query.as_deref().filter(|q| !q.is_empty()));

        let body = if inbound.method == Method::GET {
            Bytes::new()
        } else {
            inbound.body
        };

        Ok(Self {
            method: inbound.method,
            url,
            headers: sanitize_request_headers(&inbound.headers),
            body,
        })
    }
}

/// Join a relay path onto the backend base URL, keeping any base path.
pub fn backend_target(backend: &Url, path: &str) -> RelayResult<Url> {
    let target = format!(
        "{}/{}",
        backend.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&target).map_err(|_| RelayError::InvalidTarget(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn inbound(method: Method, path: &str, query: Option<&str>) -> InboundRequest {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("cloud.local"));
        headers.insert("origin", HeaderValue::from_static("http://cloud.local"));
        headers.insert("cookie", HeaderValue::from_static("_session=abc"));
        InboundRequest {
            method,
            path: path.to_string(),
            query: query.map(str::to_string),
            headers,
            body: Bytes::from_static(b"payload"),
        }
    }

    #[test]
    fn test_target_url_joins_path() {
        let backend = Url::parse("http://localhost:3000").unwrap();
        let out = OutboundRequest::from_inbound(
            &backend,
            inbound(Method::GET, "projects/demo", Some("a=1&b=2")),
        )
        .unwrap();
        assert_eq!(out.url.as_str(), "http://localhost:3000/projects/demo?a=1&b=2");
    }

    #[test]
    fn test_target_keeps_backend_base_path() {
        let backend = Url::parse("http://op.internal/openproject/").unwrap();
        let url = backend_target(&backend, "api/v3").unwrap();
        assert_eq!(url.as_str(), "http://op.internal/openproject/api/v3");
    }

    #[test]
    fn test_empty_path_targets_backend_root() {
        let backend = Url::parse("http://localhost:3000").unwrap();
        let url = backend_target(&backend, "").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/");
    }

    #[test]
    fn test_outbound_drops_host_origin_and_get_body() {
        let backend = Url::parse("http://localhost:3000").unwrap();
        let out =
            OutboundRequest::from_inbound(&backend, inbound(Method::GET, "x", None)).unwrap();
        assert!(out.headers.get("host").is_none());
        assert!(out.headers.get("origin").is_none());
        assert_eq!(out.headers.get("cookie").unwrap(), "_session=abc");
        assert!(out.body.is_empty());
        assert!(out.url.query().is_none());
    }

    #[test]
    fn test_non_get_keeps_body() {
        let backend = Url::parse("http://localhost:3000").unwrap();
        let out = OutboundRequest::from_inbound(&backend, inbound(Method::PATCH, "x", None))
            .unwrap();
        assert_eq!(&out.body[..], b"payload");
    }
}
