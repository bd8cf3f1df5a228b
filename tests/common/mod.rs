//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

use openproject_relay::config::RelayConfig;
use openproject_relay::{HttpServer, Shutdown};

pub const FRONTEND_URL: &str = "http://nextcloud.local/index.php";
pub const FRONTEND_ORIGIN: &str = "http://nextcloud.local";
pub const OWN_MOUNT_LOCATION: &str =
    "http://localhost:3000/index.php/apps/app_api/proxy/openproject-nextcloud-app/foo/bar";
pub const OAUTH2_LOCATION: &str =
    "http://nextcloud.local/index.php/apps/oauth2/authorize?client_id=op&response_type=code";

/// Echo what the backend received as JSON.
async fn echo(request: Request) -> Json<Value> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    let mut headers = Map::new();
    for (name, value) in parts.headers.iter() {
        headers.insert(
            name.as_str().to_string(),
            Value::String(value.to_str().unwrap_or_default().to_string()),
        );
    }

    Json(json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query().unwrap_or_default(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

fn redirect(status: StatusCode, location: &str) -> Response {
    (status, [(header::LOCATION, location.to_string())], "redirecting").into_response()
}

/// Start a backend with echo, redirect and failure endpoints on an
/// ephemeral port.
pub async fn start_mock_backend() -> SocketAddr {
    let app = Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/heartbeat", any(echo))
        .route("/enabled", any(echo))
        .route(
            "/redirect/own",
            any(|| async { redirect(StatusCode::FOUND, OWN_MOUNT_LOCATION) }),
        )
        .route(
            "/oauth/authorize",
            get(|| async { redirect(StatusCode::FOUND, OAUTH2_LOCATION) }),
        )
        .route(
            "/redirect/oauth2",
            get(|| async { redirect(StatusCode::FOUND, OAUTH2_LOCATION) }),
        )
        .route(
            "/redirect/generic",
            any(|| async { redirect(StatusCode::FOUND, "/echo/landed") }),
        )
        .route(
            "/redirect/temporary",
            any(|| async { redirect(StatusCode::TEMPORARY_REDIRECT, "/echo/landed") }),
        )
        .route(
            "/redirect/chain",
            any(|| async { redirect(StatusCode::MOVED_PERMANENTLY, "/redirect/temporary") }),
        )
        .route(
            "/redirect/loop",
            any(|| async { redirect(StatusCode::FOUND, "/redirect/loop") }),
        )
        .route(
            "/redirect/no-location",
            get(|| async { (StatusCode::FOUND, "nowhere").into_response() }),
        )
        .route(
            "/not-modified",
            get(|| async { redirect(StatusCode::NOT_MODIFIED, "/echo/landed") }),
        )
        .route(
            "/encoded",
            get(|| async {
                let mut headers = HeaderMap::new();
                headers.insert(header::CONTENT_ENCODING, "identity".parse().unwrap());
                headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
                (headers, Bytes::from_static(b"plain body")).into_response()
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Relay configuration pointing at `backend`.
pub fn relay_config(backend: SocketAddr) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.backend_url = format!("http://{}", backend);
    config.upstream.frontend_url = FRONTEND_URL.into();
    config
}

/// Start the relay on an ephemeral port. Keep the returned `Shutdown` alive
/// for the duration of the test.
pub async fn start_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}

/// Test client that never follows redirects itself.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Start a backend and a relay in front of it.
pub async fn setup() -> (SocketAddr, Shutdown) {
    let backend = start_mock_backend().await;
    start_relay(relay_config(backend)).await
}
