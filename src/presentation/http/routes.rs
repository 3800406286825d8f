//! Route Configuration
//!
//! The relay's path-to-handler mapping.

use axum::{
    http::header::CONTENT_TYPE,
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::require_session;
use crate::presentation::websocket::ws_handler;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::pages::index))
        .route("/login", get(handlers::pages::login_page))
        .merge(chat_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Chat page and relay socket, both behind the access gate
fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/chat", get(handlers::pages::chat_page))
        .route("/room", get(ws_handler))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> Result<impl IntoResponse, AppError> {
    let metrics = metrics::gather_metrics()?;
    Ok((
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        metrics,
    ))
}
