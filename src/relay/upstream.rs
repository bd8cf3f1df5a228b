//! The single backend the relay talks to, and the origin the caller expects.
//!
//! Resolved once at startup from `UpstreamConfig` and shared read-only by
//! every request.

use url::Url;

use crate::config::{UpstreamConfig, ValidationError};
use crate::routing::matcher::{Matcher, PathSegmentsMatcher};

#[derive(Debug, Clone)]
pub struct Upstream {
    /// Pre-parsed backend base URL.
    pub backend: Url,
    /// Scheme and host of the front-end platform, e.g. `https://cloud.example.com`.
    pub frontend_origin: String,
    own_mount: PathSegmentsMatcher,
}

impl Upstream {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ValidationError> {
        let backend = Url::parse(&config.backend_url)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
            .ok_or_else(|| ValidationError::BackendUrl(config.backend_url.clone()))?;

        let frontend_origin = frontend_origin(&config.frontend_url)
            .ok_or_else(|| ValidationError::FrontendUrl(config.frontend_url.clone()))?;

        if config.mount_path.trim_matches('/').is_empty() {
            return Err(ValidationError::EmptyMountPath);
        }

        Ok(Self {
            backend,
            frontend_origin,
            own_mount: PathSegmentsMatcher::new(&config.mount_path),
        })
    }

    /// Does `url` point back at the relay's own mount under the platform?
    pub fn is_own_mount(&self, url: &Url) -> bool {
        self.own_mount.matches(url)
    }

    /// Map a URL under the relay's mount to the same path on the front-end origin.
    pub fn frontend_location(&self, url: &Url) -> String {
        format!("{}{}", self.frontend_origin, url.path())
    }
}

/// Reduce a URL to scheme + host (+ explicit non-default port).
pub fn frontend_origin(url: &str) -> Option<String> {
    let origin = Url::parse(url).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
