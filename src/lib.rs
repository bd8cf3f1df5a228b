//! Reverse-proxy relay between an embedding platform and one backend
//! application server.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::Relay;
