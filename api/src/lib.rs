//! Devscope API Server
//!
//! This crate serves the telemetry of a monitored application server as JSON for the
//! devscope dashboard: log tails, runtime and application metrics, the profiled event
//! history and advisory recommendations.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio. All data is read on demand from the
//! monitored server's `var` directory through [`shared::insights::InsightsCollector`];
//! nothing is stored by the server itself.
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod routes;
mod state;

pub use config::Config;
pub use routes::ApiError;
pub use state::AppState;

use anyhow::Result;
use axum::http::Method;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Runs the devscope API server.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the devscope API server with the provided configuration.
///
/// No collaborators are attached, so event-history sections stay empty. Embed the
/// router with [`create_router`] and an [`AppState`] carrying collaborators to fill them.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid, including a host that is not an IP address
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        var_dir = %config.devtools.var_dir.display(),
        app = %config.devtools.app_name,
        "devscope API server starting"
    );

    let state = AppState::from_config(config.devtools)?;
    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::logs_routes(state.clone()))
        .merge(routes::metrics_routes(state.clone()))
        .merge(routes::profiler_routes(state.clone()))
        .merge(routes::insights_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
