//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::track_metrics;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics::gather_metrics(),
    )
}

/// Business routes. Every request under `/api` passes the metrics layer.
fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/user", user_routes())
        .nest("/conn", conn_routes())
        .route_layer(middleware::from_fn(track_metrics))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::user::create_user))
        .route("/{user_id}", get(handlers::user::get_user))
}

fn conn_routes() -> Router<AppState> {
    Router::new()
        .route("/send", post(handlers::conn::send_message))
        .route("/{user_id}/messages", get(handlers::conn::conversation))
}
