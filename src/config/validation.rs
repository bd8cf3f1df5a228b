//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that backend and front-end URLs are usable
//! - Validate value ranges (timeouts > 0, hop limit > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),

    #[error("backend_url `{0}` is not an http(s) URL")]
    BackendUrl(String),

    #[error("frontend_url `{0}` has no scheme and host")]
    FrontendUrl(String),

    #[error("mount_path must not be empty")]
    EmptyMountPath,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let upstream = &config.upstream;
    match Url::parse(&upstream.backend_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::BackendUrl(upstream.backend_url.clone())),
    }

    match Url::parse(&upstream.frontend_url) {
        Ok(url) if url.origin().is_tuple() => {}
        _ => errors.push(ValidationError::FrontendUrl(upstream.frontend_url.clone())),
    }

    if upstream.mount_path.trim_matches('/').is_empty() {
        errors.push(ValidationError::EmptyMountPath);
    }

    if config.redirects.max_hops == 0 {
        errors.push(ValidationError::Zero("redirects.max_hops"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.hop_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.hop_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
