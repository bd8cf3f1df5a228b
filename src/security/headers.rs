//! Header sanitization in both directions.
//!
//! # Responsibilities
//! - Drop `host` and `origin` before forwarding (backend routing and CSRF
//!   checks must see the backend's own host)
//! - Drop `transfer-encoding` and `content-encoding` from backend responses
//! - Recompute `content-length` from the body actually returned
//! - Add the fixed Content-Security-Policy response header
//!
//! # Design Decisions
//! - `HeaderMap` names are already lower-case, so matching is case-insensitive
//! - Multi-valued headers (e.g. `set-cookie`) are preserved as-is
//! - Absent headers are no-ops

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Policy attached to every response so the embedding page can render the
/// backend's UI.
pub const CONTENT_SECURITY_POLICY: &str =
    "default-src * 'unsafe-inline' 'unsafe-eval' data: blob:;";

const STRIPPED_REQUEST_HEADERS: &[HeaderName] = &[header::HOST, header::ORIGIN];

const STRIPPED_RESPONSE_HEADERS: &[HeaderName] =
    &[header::TRANSFER_ENCODING, header::CONTENT_ENCODING];

/// Copy inbound headers for the backend, minus `host` and `origin`.
pub fn sanitize_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = inbound.clone();
    for name in STRIPPED_REQUEST_HEADERS {
        outbound.remove(name);
    }
    outbound
}

/// Make backend response headers safe to return for a body of `body_len` bytes.
pub fn finalize_response_headers(headers: &mut HeaderMap, body_len: usize) {
    for name in STRIPPED_RESPONSE_HEADERS {
        headers.remove(name);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body_len));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
}
