//! HTTP interface: server-rendered pages plus a suggestion JSON endpoint.
//!
//! ## Endpoints
//!
//! - `GET /`: search form and recent searches
//! - `POST /`: run a search, render results
//! - `GET /history`: every recorded search plus the storage listing
//! - `GET /ajax-search?q=`: live suggestions as JSON
//! - `GET /download/{filename}`: presigned redirect or streamed file
//! - `POST /delete/{filename}`: delete, then back to history
//! - `GET /health`: liveness

mod handlers;
mod pages;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{AppError, Result};
use crate::service::SearchService;

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<SearchService>,
}

impl AppState {
    pub fn new(service: Arc<SearchService>) -> Self {
        Self { service }
    }
}

/// Build the application router.
pub fn router(service: Arc<SearchService>) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::search))
        .route("/history", get(handlers::history))
        .route("/ajax-search", get(handlers::ajax_search))
        .route("/download/{filename}", get(handlers::download))
        .route("/delete/{filename}", post(handlers::delete))
        .route("/health", get(handlers::health))
        .with_state(AppState::new(service))
}

/// Bind `{host}:{port}` and serve until the process stops.
///
/// # Errors
///
/// Returns [`AppError::Server`] if the listener cannot bind or the server
/// fails.
pub async fn serve(service: Arc<SearchService>, config: &ServerConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind {bind_addr} failed: {e}")))?;
    let addr: SocketAddr = listener
        .local_addr()
        .map_err(|e| AppError::Server(format!("failed to get local addr: {e}")))?;

    info!("serpkeep listening on http://{addr}/");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
