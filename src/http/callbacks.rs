//! Lifecycle routes the hosting platform calls directly.
//!
//! These sit next to the catch-all relay route and never reach the backend.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct Heartbeat {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CallbackResult {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct EnabledParams {
    pub enabled: String,
}

/// `GET /heartbeat`
pub async fn heartbeat() -> Json<Heartbeat> {
    Json(Heartbeat { status: "ok" })
}

/// `PUT /enabled?enabled=1|0`
pub async fn enabled(Query(params): Query<EnabledParams>) -> Response {
    let Some(enabled) = parse_flag(&params.enabled) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(CallbackResult {
                error: format!("invalid value for `enabled`: {}", params.enabled),
            }),
        )
            .into_response();
    };

    if enabled {
        tracing::info!(app = env!("CARGO_PKG_NAME"), "App is enabled");
    } else {
        tracing::info!(app = env!("CARGO_PKG_NAME"), "App is disabled");
    }

    Json(CallbackResult {
        error: String::new(),
    })
    .into_response()
}

/// Accepts the boolean spellings platforms commonly send in query strings.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
