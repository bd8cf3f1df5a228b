//! Relay pipeline.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → http::request (target = backend + "/" + path, headers sanitized)
//!     → routing::rewrite (GET only: referer / storage id fixes)
//!     → forwarder.rs (one backend exchange, no transport redirects)
//!     → redirect.rs (classify, maybe rewrite or follow, bounded)
//!     → http::response (strip encodings, exact content-length, CSP)
//!     → ProxyResponse
//! ```
//!
//! # Design Decisions
//! - No state survives a request; `Relay` only holds immutable config and
//!   the shared client
//! - Every failure propagates to the server boundary; nothing is retried

pub mod forwarder;
pub mod redirect;
pub mod upstream;

use std::sync::Arc;

use crate::config::{ConfigError, RelayConfig};
use crate::error::RelayResult;
use crate::http::request::{InboundRequest, OutboundRequest};
use crate::http::response::ProxyResponse;
use crate::routing::rewrite_request;

pub use forwarder::{BackendResponse, Forwarder};
pub use redirect::{classify, is_redirect, RedirectAction};
pub use upstream::Upstream;

/// Relays requests to the configured backend.
#[derive(Debug, Clone)]
pub struct Relay {
    upstream: Arc<Upstream>,
    forwarder: Forwarder,
    max_hops: u32,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> Result<Self, ConfigError> {
        let upstream = Upstream::from_config(&config.upstream)
            .map_err(|e| ConfigError::Validation(vec![e]))?;
        let forwarder = Forwarder::new(&config.timeouts)?;

        Ok(Self {
            upstream: Arc::new(upstream),
            forwarder,
            max_hops: config.redirects.max_hops,
        })
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Run one inbound request through the full pipeline.
    pub async fn relay(&self, inbound: InboundRequest) -> RelayResult<ProxyResponse> {
        let mut request = OutboundRequest::from_inbound(&self.upstream.backend, inbound)?;
        rewrite_request(&mut request);

        let response = self.forwarder.send(&request).await?;
        let response = redirect::resolve(
            &self.forwarder,
            &self.upstream,
            self.max_hops,
            &request,
            response,
        )
        .await?;

        Ok(ProxyResponse::from_backend(response))
    }
}
