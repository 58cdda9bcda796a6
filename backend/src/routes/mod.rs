//! Route definitions for the Items API
//!
//! Public routes (health, auth, metrics) sit next to the item routes, which
//! are gated by [`require_auth`]. Request metrics wrap everything, including
//! panic recovery and the request timeout, so every request is counted.

use crate::auth::require_auth;
use crate::instrumentation::track_metrics;
use crate::state::AppState;
use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use items_api_shared::types::{ErrorDetail, ErrorResponse};
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod auth;
mod health;
mod items;
mod metrics;


pub use auth::auth_routes;
pub use items::item_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config().server.request_timeout_secs);

    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::readiness_check))
        .route("/api/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::render_metrics))
        .nest("/api/v1", api_routes(&state))
        .fallback(not_found)
        // Innermost first: panics and timeouts become responses before
        // track_metrics sees them
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn(track_metrics))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes
fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::auth_routes())
        .nest(
            "/items",
            items::item_routes().route_layer(middleware::from_fn_with_state(
                state.tokens().clone(),
                require_auth,
            )),
        )
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: ErrorDetail {
                code: "NOT_FOUND".to_string(),
                message: "Route not found".to_string(),
                field: None,
            },
        }),
    )
}
