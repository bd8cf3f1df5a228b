//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, lifecycle routes)
//!     → request.rs (InboundRequest → OutboundRequest)
//!     → [relay pipeline]
//!     → response.rs (sanitized ProxyResponse, error mapping)
//!     → Send to caller
//! ```

pub mod callbacks;
pub mod request;
pub mod response;
pub mod server;

pub use request::{InboundRequest, OutboundRequest};
pub use response::ProxyResponse;
pub use server::HttpServer;
