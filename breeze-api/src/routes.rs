//! Router setup and the server entry point.

use std::net::SocketAddr;

use anyhow::Context as _;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/logs", get(handlers::list_logs))
        .route("/logs/{user_id}", get(handlers::list_user_logs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve the log API until the listener fails.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind log API on {addr}"))?;

    info!(%addr, "log API listening");

    axum::serve(listener, create_router(state))
        .await
        .context("log API server stopped")
}
