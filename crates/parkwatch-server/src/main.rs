//! # parkwatch-server
//!
//! HTTP server for the parkwatch vehicle parking tracker.
//!
//! This binary provides:
//! - REST API for vehicle check-in, check-out and lookup
//! - OpenAPI documentation via Swagger UI
//! - Structured logging to file and stdout
//!
//! ## Running
//!
//! ```bash
//! # Development
//! PARKWATCH_CONFIG=./config.toml cargo run --package parkwatch-server
//!
//! # Override single settings
//! PARKWATCH__SERVER__PORT=8080 ./parkwatch-server
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use parkwatch_core::ParkingConfig;
use parkwatch_server::api::create_router;
use parkwatch_server::logging;
use parkwatch_server::state::AppState;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ParkingConfig::load()?;

    logging::init(&config.logging)?;

    info!(
        backend = ?config.storage.backend,
        locale = %config.locale.default,
        timezone = %config.facility.timezone,
        "Starting parkwatch-server"
    );

    let state = AppState::from_config(&config)?;
    let app = create_router(state);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
