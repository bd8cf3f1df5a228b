//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend and front-end origins.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Redirect following limits.
    pub redirects: RedirectConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:23000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:23000".to_string(),
        }
    }
}

/// Where requests are relayed to, and which origin the caller expects.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the backend application server.
    pub backend_url: String,

    /// URL of the embedding platform. Only scheme and host are used.
    pub frontend_url: String,

    /// Path under which the platform mounts this relay.
    pub mount_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000".to_string(),
            frontend_url: "http://localhost/index.php".to_string(),
            mount_path: "proxy/openproject-nextcloud-app".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for a single backend exchange (one hop) in seconds.
    pub hop_secs: u64,

    /// Total time allowed for an inbound request, all hops included.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            hop_secs: 30,
            request_secs: 120,
        }
    }
}

/// Redirect following configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Maximum number of redirects followed for one inbound request.
    pub max_hops: u32,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self { max_hops: 10 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: RelayConfig = toml::from_str("").unwrap();
        assert_eq!(config.upstream.backend_url, "http://localhost:3000");
        assert_eq!(config.upstream.frontend_url, "http://localhost/index.php");
        assert_eq!(config.redirects.max_hops, 10);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [upstream]
            backend_url = "http://openproject:8080"

            [redirects]
            max_hops = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.upstream.backend_url, "http://openproject:8080");
        assert_eq!(config.upstream.mount_path, "proxy/openproject-nextcloud-app");
        assert_eq!(config.redirects.max_hops, 3);
        assert_eq!(config.timeouts.hop_secs, 30);
    }
}
