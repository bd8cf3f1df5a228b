//! Outbound HTTP client.
//!
//! # Responsibilities
//! - Send exactly one request per call to the backend
//! - Never follow redirects at the transport level
//! - Enforce connect and per-hop deadlines
//! - Return status, headers and the fully read body untouched
//!
//! # Design Decisions
//! - One shared `reqwest::Client` (connection pool) for all requests
//! - Response bodies are content-decoded by the client, so the relay can
//!   drop `content-encoding` without corrupting the body
//! - The caller's `accept-encoding` is replaced by the client's own, so the
//!   backend only picks encodings the client can decode
//! - Network failures are fatal for the request; no retry

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode};
use reqwest::{redirect, Client};

use crate::config::TimeoutConfig;
use crate::error::{RelayError, RelayResult};
use crate::http::request::OutboundRequest;
use crate::resilience::with_hop_timeout;

/// A backend reply, fully buffered.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    hop_timeout: Duration,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            hop_timeout: Duration::from_secs(timeouts.hop_secs),
        })
    }

    /// Perform one exchange with the backend.
    pub async fn send(&self, request: &OutboundRequest) -> RelayResult<BackendResponse> {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            body_len = request.body.len(),
            "Forwarding to backend"
        );

        with_hop_timeout(self.hop_timeout, self.exchange(request)).await
    }

    async fn exchange(&self, request: &OutboundRequest) -> RelayResult<BackendResponse> {
        // Without an explicit header, reqwest advertises exactly what it decodes.
        let mut headers = request.headers.clone();
        headers.remove(header::ACCEPT_ENCODING);

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(headers);
        if request.method != Method::GET {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(RelayError::UpstreamUnreachable)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(RelayError::UpstreamUnreachable)?;

        tracing::debug!(status = %status, body_len = body.len(), "Backend responded");

        Ok(BackendResponse {
            status,
            headers,
            body,
        })
    }
}
