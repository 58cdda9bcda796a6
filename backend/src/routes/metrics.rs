//! Prometheus scrape endpoint

use crate::state::AppState;
use axum::{extract::State, http::header, response::IntoResponse};

/// GET /metrics - Render all recorded metrics in the text exposition format
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
