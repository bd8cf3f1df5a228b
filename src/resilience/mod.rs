//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend (each hop):
//!     → timeouts.rs (enforce per-hop deadline)
//!     → On failure: error propagates to the server boundary
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - No retries: a failed hop fails the inbound request
//! - Redirect chains are bounded by `redirects.max_hops`

pub mod timeouts;

pub use timeouts::with_hop_timeout;
