//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (drop host/origin before forwarding)
//!
//! Outgoing response:
//!     → headers.rs (drop transfer/content-encoding, exact content-length, CSP)
//! ```
//!
//! # Design Decisions
//! - Caller authentication happens in the hosting platform, before the relay
//! - The same response sanitizer runs on success and error paths

pub mod headers;

pub use headers::{finalize_response_headers, sanitize_request_headers, CONTENT_SECURITY_POLICY};
