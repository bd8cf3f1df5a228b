//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn the final backend response into the caller's response
//! - Strip encodings, set exact content-length, add the CSP header
//! - Map relay errors to complete responses with the same header treatment
//!
//! # Design Decisions
//! - Bodies are buffered, so content-length is always exact
//! - Backend timeouts result in 504 Gateway Timeout, other upstream
//!   failures in 502 Bad Gateway

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::RelayError;
use crate::relay::forwarder::BackendResponse;
use crate::security::finalize_response_headers;

/// A response ready to be sent to the caller.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyResponse {
    pub fn new(status: StatusCode, mut headers: HeaderMap, body: Bytes) -> Self {
        finalize_response_headers(&mut headers, body.len());
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn from_backend(response: BackendResponse) -> Self {
        Self::new(response.status, response.headers, response.body)
    }

    /// Plain-text error response, still carrying the relay's response headers.
    pub fn from_error(error: &RelayError) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self::new(error.status_code(), headers, Bytes::from(error.to_string()))
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        ProxyResponse::from_error(&self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::CONTENT_SECURITY_POLICY;

    #[test]
    fn test_from_backend_sanitizes_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));

        let response = ProxyResponse::from_backend(BackendResponse {
            status: StatusCode::CREATED,
            headers,
            body: Bytes::from_static(b"<p>ok</p>"),
        });

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.headers.get(header::CONTENT_LENGTH).unwrap(), "9");
        assert_eq!(response.headers.get(header::CONTENT_TYPE).unwrap(), "text/html");
        assert!(response.headers.get(header::CONTENT_ENCODING).is_none());
        assert!(response.headers.get(header::TRANSFER_ENCODING).is_none());
    }

    #[test]
    fn test_error_response_has_csp_and_exact_length() {
        let error = RelayError::TooManyRedirects { hops: 10 };
        let response = ProxyResponse::from_error(&error);

        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers.get(header::CONTENT_SECURITY_POLICY).unwrap(),
            CONTENT_SECURITY_POLICY
        );
        assert_eq!(
            response.headers.get(header::CONTENT_LENGTH).unwrap(),
            &response.body.len().to_string()
        );
    }

    #[test]
    fn test_into_response_keeps_status_and_headers() {
        let response = ProxyResponse::new(StatusCode::NO_CONTENT, HeaderMap::new(), Bytes::new())
            .into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers().get(header::CONTENT_LENGTH).unwrap(), "0");
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }
}
