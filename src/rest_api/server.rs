//! Axum HTTP servers for the dashboard API and metrics

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{Error, Result};

use super::handlers::{self, ApiState};

/// Listener ports for the API and metrics servers
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub port: u16,
    pub metrics_port: u16,
}

/// Routes serving snapshot views and readiness
pub fn api_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/applications", get(handlers::list_all))
        .route("/api/v1/applications/updates", get(handlers::list_updates))
        .route("/api/v1/applications/helm", get(handlers::list_helm))
        .route("/api/v1/applications/git", get(handlers::list_git))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn metrics_router(state: ApiState) -> Router {
    Router::new()
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

async fn serve(router: Router, port: u16, name: &str) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::ConfigError(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("{} server listening on {}", name, addr);
    axum::serve(listener, router)
        .await
        .map_err(|e| Error::ConfigError(format!("Server error: {}", e)))
}

/// Run the API and metrics servers until either fails
pub async fn run_server(state: ApiState, config: ServerConfig) -> Result<()> {
    let api = serve(api_router(state.clone()), config.port, "REST API");
    let metrics = serve(metrics_router(state), config.metrics_port, "Metrics");

    tokio::try_join!(api, metrics)?;
    Ok(())
}
