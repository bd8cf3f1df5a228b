//! Redirect resolution.
//!
//! A backend redirect is classified once, in this order:
//!
//! | Condition | Action |
//! |---|---|
//! | not a redirect (304 included) | pass through |
//! | `location` under the relay's own mount | rewrite to the front-end origin, 200 |
//! | request went to the backend's `oauth/authorize` | return raw redirect |
//! | `location` is the platform's `apps/oauth2/authorize` | 200, location kept |
//! | anything else | follow the chain until a non-redirect |
//!
//! Following re-sends the sanitized request headers with `content-length: 0`
//! and no body. A 307 keeps the method of the request that received it; any
//! other redirect downgrades to GET. The chain is bounded by `max_hops`.

use axum::body::Bytes;
use axum::http::header::{self, HeaderValue};
use axum::http::{Method, StatusCode};
use url::Url;

use crate::error::{RelayError, RelayResult};
use crate::http::request::OutboundRequest;
use crate::observability::metrics;
use crate::relay::forwarder::{BackendResponse, Forwarder};
use crate::relay::upstream::Upstream;
use crate::routing::matcher::{is_oauth2_authorize, is_oauth_authorize};

/// Statuses treated as redirects. 304 is deliberately absent.
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// What to do with a backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectAction {
    PassThrough,
    RewriteToFrontend { location: String },
    ReturnRaw,
    ForceOk,
    Follow { method: Method, url: Url },
}

impl RedirectAction {
    fn label(&self) -> &'static str {
        match self {
            RedirectAction::PassThrough => "pass_through",
            RedirectAction::RewriteToFrontend { .. } => "rewrite_to_frontend",
            RedirectAction::ReturnRaw => "return_raw",
            RedirectAction::ForceOk => "force_ok",
            RedirectAction::Follow { .. } => "follow",
        }
    }
}

/// Resolve the `location` of a redirect relative to the URL that produced it.
pub fn location_of(request_url: &Url, response: &BackendResponse) -> Option<Url> {
    let location = response.headers.get(header::LOCATION)?.to_str().ok()?;
    request_url.join(location.trim()).ok()
}

fn next_method(status: StatusCode, current: &Method) -> Method {
    if status == StatusCode::TEMPORARY_REDIRECT {
        current.clone()
    } else {
        Method::GET
    }
}

/// Decide how to handle the first backend response for `request`.
pub fn classify(
    upstream: &Upstream,
    request: &OutboundRequest,
    response: &BackendResponse,
) -> RelayResult<RedirectAction> {
    if !is_redirect(response.status) {
        return Ok(RedirectAction::PassThrough);
    }

    let location = location_of(&request.url, response);

    if let Some(url) = location.as_ref().filter(|url| upstream.is_own_mount(url)) {
        return Ok(RedirectAction::RewriteToFrontend {
            location: upstream.frontend_location(url),
        });
    }

    if is_oauth_authorize(&request.url) {
        return Ok(RedirectAction::ReturnRaw);
    }

    let url = location.ok_or(RelayError::MalformedRedirect {
        status: response.status.as_u16(),
    })?;

    if is_oauth2_authorize(&url) {
        return Ok(RedirectAction::ForceOk);
    }

    Ok(RedirectAction::Follow {
        method: next_method(response.status, &request.method),
        url,
    })
}

/// Apply the redirect policy to the first backend response, following the
/// chain when required.
pub async fn resolve(
    forwarder: &Forwarder,
    upstream: &Upstream,
    max_hops: u32,
    request: &OutboundRequest,
    mut response: BackendResponse,
) -> RelayResult<BackendResponse> {
    let action = classify(upstream, request, &response)?;
    if action != RedirectAction::PassThrough {
        tracing::debug!(status = %response.status, action = action.label(), "Backend redirected");
        metrics::record_redirect(action.label());
    }

    match action {
        RedirectAction::PassThrough | RedirectAction::ReturnRaw => Ok(response),
        RedirectAction::RewriteToFrontend { location } => {
            let value = HeaderValue::try_from(location).map_err(|_| {
                RelayError::MalformedRedirect {
                    status: response.status.as_u16(),
                }
            })?;
            response.headers.insert(header::LOCATION, value);
            response.status = StatusCode::OK;
            Ok(response)
        }
        RedirectAction::ForceOk => {
            response.status = StatusCode::OK;
            Ok(response)
        }
        RedirectAction::Follow { method, url } => {
            follow(forwarder, max_hops, request, method, url).await
        }
    }
}

/// Follow a redirect chain with an explicit hop budget.
async fn follow(
    forwarder: &Forwarder,
    max_hops: u32,
    origin: &OutboundRequest,
    mut method: Method,
    mut url: Url,
) -> RelayResult<BackendResponse> {
    let mut headers = origin.headers.clone();
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));

    for hop in 1..=max_hops {
        let request = OutboundRequest {
            method,
            url,
            headers: headers.clone(),
            body: Bytes::new(),
        };
        tracing::debug!(hop, method = %request.method, url = %request.url, "Following redirect");

        let response = forwarder.send(&request).await?;
        if !is_redirect(response.status) {
            return Ok(response);
        }

        url = location_of(&request.url, &response).ok_or(RelayError::MalformedRedirect {
            status: response.status.as_u16(),
        })?;
        method = next_method(response.status, &request.method);
    }

    tracing::warn!(max_hops, url = %origin.url, "Redirect chain exceeded hop limit");
    Err(RelayError::TooManyRedirects { hops: max_hops })
}
