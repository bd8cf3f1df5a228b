//! Relay error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

/// Failures that abort a single relayed request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),

    #[error("upstream did not answer within {0:?}")]
    UpstreamTimeout(std::time::Duration),

    #[error("redirect {status} without a usable location header")]
    MalformedRedirect { status: u16 },

    #[error("gave up after {hops} redirects")]
    TooManyRedirects { hops: u32 },

    #[error("invalid target URL `{0}`")]
    InvalidTarget(String),

    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

impl RelayError {
    /// Status code reported to the caller for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::BodyRead(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamUnreachable(_)
            | RelayError::MalformedRedirect { .. }
            | RelayError::TooManyRedirects { .. }
            | RelayError::InvalidTarget(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
