//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap every backend exchange (one hop) with a deadline
//! - Cancel the in-flight exchange cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use crate::error::{RelayError, RelayResult};

/// Run one backend exchange, failing with `UpstreamTimeout` past `limit`.
pub async fn with_hop_timeout<F, T>(limit: Duration, exchange: F) -> RelayResult<T>
where
    F: Future<Output = RelayResult<T>>,
{
    match tokio::time::timeout(limit, exchange).await {
        Ok(result) => result,
        Err(_) => Err(RelayError::UpstreamTimeout(limit)),
    }
}
