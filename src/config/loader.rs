//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply process environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay the environment variables the hosting platform sets for the app.
///
/// - `OP_BACKEND_URL` → `upstream.backend_url`
/// - `NEXTCLOUD_URL` → `upstream.frontend_url`
/// - `APP_HOST` / `APP_PORT` → `listener.bind_address`
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = lookup("OP_BACKEND_URL") {
        config.upstream.backend_url = url.trim_end_matches('/').to_string();
    }
    if let Some(url) = lookup("NEXTCLOUD_URL") {
        config.upstream.frontend_url = url;
    }

    let host = lookup("APP_HOST");
    let port = lookup("APP_PORT");
    if host.is_some() || port.is_some() {
        let (default_host, default_port) = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(h, p)| (h.to_string(), p.to_string()))
            .unwrap_or_else(|| (config.listener.bind_address.clone(), String::new()));
        config.listener.bind_address = format!(
            "{}:{}",
            host.unwrap_or(default_host),
            port.unwrap_or(default_port)
        );
    }
}
