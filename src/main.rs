//! OpenProject relay
//!
//! Forwards every request the platform sends to this app to the backend
//! application server, and reshapes the backend's redirects so that the
//! backend appears to live under the platform's origin.
//!
//! ```text
//!     Platform (already authenticated)
//!         │
//!         ▼
//!  ┌──────────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐
//!  │ http server  │──▶│ sanitize │──▶│  rewrite  │──▶│ forward  │──▶ Backend
//!  │ (axum)       │   │ headers  │   │ (GET)     │   │ (1 hop)  │
//!  └──────────────┘   └──────────┘   └───────────┘   └────┬─────┘
//!         ▲                                               │
//!         │           ┌──────────┐   ┌───────────┐        │
//!         └───────────│ response │◀──│ redirects │◀───────┘
//!                     │ headers  │   │ (bounded) │
//!                     └──────────┘   └───────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use openproject_relay::config::load_config;
use openproject_relay::lifecycle::{shutdown_on_signal, Shutdown};
use openproject_relay::observability::{logging, metrics};
use openproject_relay::HttpServer;

#[derive(Parser)]
#[command(name = "openproject-relay")]
#[command(about = "Relay platform requests to the OpenProject backend", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "openproject-relay starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend_url = %config.upstream.backend_url,
        max_hops = config.redirects.max_hops,
        hop_timeout_secs = config.timeouts.hop_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown_on_signal(shutdown));

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
