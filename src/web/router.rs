//! Router configuration.

use axum::{
    middleware,
    routing::{any, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{check, check_source, status_webhook, AppState};
use super::middleware::{require_secret, SharedSecret};

/// Create the relay router.
///
/// Polling routes accept any method and require the shared secret when one
/// is configured; the status webhook does not.
pub fn create_router(app_state: Arc<AppState>, secret: &str) -> Router {
    let secret = Arc::new(SharedSecret::new(secret));

    let polling_routes = Router::new()
        .route("/", any(check))
        .route("/check", any(check))
        .route("/check/:source", any(check_source))
        .route_layer(middleware::from_fn_with_state(secret, require_secret));

    let webhook_routes = Router::new().route("/status", post(status_webhook));

    Router::new()
        .merge(polling_routes)
        .merge(webhook_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::new()),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Full application: relay routes plus health check.
pub fn create_app(app_state: Arc<AppState>, secret: &str) -> Router {
    create_router(app_state, secret).merge(create_health_router())
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
