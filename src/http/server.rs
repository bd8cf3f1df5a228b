//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the lifecycle routes and the catch-all relay
//! - Wire up middleware (request ID, tracing, CORS, CSP, limits, timeout)
//! - Bind server to listener and shut down gracefully
//! - Hand every other request to the relay pipeline
//!
//! # Design Decisions
//! - Lifecycle paths answer only their own method locally; every other
//!   relay method on those paths goes to the backend like any other path
//! - CORS answers real preflights (OPTIONS carrying
//!   `access-control-request-method`); a plain OPTIONS is relayed

use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, on, put, MethodFilter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{service_fn, ServiceBuilder, ServiceExt};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Instrument;

use crate::config::{ConfigError, RelayConfig};
use crate::error::RelayError;
use crate::http::callbacks;
use crate::http::request::InboundRequest;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::relay::Relay;
use crate::security::CONTENT_SECURITY_POLICY;

/// Methods accepted by the catch-all relay route.
const RELAY_METHODS: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::HEAD)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::OPTIONS);

/// Relay methods on `/heartbeat` other than its local GET (and HEAD).
const HEARTBEAT_RELAYED: MethodFilter = MethodFilter::POST
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::OPTIONS);

/// Relay methods on `/enabled` other than its local PUT.
const ENABLED_RELAYED: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::HEAD)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::OPTIONS);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ConfigError> {
        let relay = Relay::new(&config)?;
        tracing::info!(
            backend = %relay.upstream().backend,
            frontend_origin = %relay.upstream().frontend_origin,
            "Relay initialized"
        );

        let router = Self::build_router(&config, AppState { relay });
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let app = Router::new()
            .route(
                "/heartbeat",
                get(callbacks::heartbeat).on(HEARTBEAT_RELAYED, relay_handler),
            )
            .route(
                "/enabled",
                put(callbacks::enabled).on(ENABLED_RELAYED, relay_handler),
            )
            .route("/{*path}", on(RELAY_METHODS, relay_handler))
            .route("/", on(RELAY_METHODS, relay_handler))
            .with_state(state);

        with_preflight_cors(app).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(CONTENT_SECURITY_POLICY),
                ))
                .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.timeouts.request_secs,
                ))),
        )
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// A CORS preflight: OPTIONS announcing the method it wants to use.
fn is_preflight(request: &Request) -> bool {
    request.method() == Method::OPTIONS
        && request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Wrap `app` in permissive CORS, except for OPTIONS requests that are not
/// preflights. `CorsLayer` answers every OPTIONS itself, so those bypass it
/// and reach the relay.
fn with_preflight_cors(app: Router) -> Router {
    let cors_app = app.clone().layer(CorsLayer::permissive());

    Router::new().fallback_service(service_fn(move |request: Request| {
        let target = if request.method() == Method::OPTIONS && !is_preflight(&request) {
            app.clone()
        } else {
            cors_app.clone()
        };
        target.oneshot(request)
    }))
}

/// Catch-all handler: relay the request to the backend.
async fn relay_handler(State(state): State<AppState>, request: Request) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().trim_start_matches('/').to_string();

    let span = tracing::info_span!(
        "relay",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let result = async {
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| RelayError::BodyRead(e.to_string()))?;

        let inbound = InboundRequest {
            method: parts.method,
            path,
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
        };
        state.relay.relay(inbound).await
    }
    .instrument(span.clone())
    .await;

    let response = match result {
        Ok(response) => response.into_response(),
        Err(e) => {
            span.in_scope(|| tracing::error!(error = %e, "Relay failed"));
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}
