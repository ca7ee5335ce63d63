use axum::{extract::State, response::Json, routing::get, Router};
use std::sync::Arc;

use crate::services::implementations::refresh_health;
use crate::webserver::models::{HealthResponse, StatusResponse};
use crate::webserver::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(get_health))
        .route("/status", get(get_status))
}

async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
        version: VERSION.to_string(),
    })
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let snapshot = state.queries.snapshot();
    let refresh = state.refresher.stats();
    let health = refresh_health(&state.refresher);

    let upstream = match &state.api {
        Some(client) => Some(client.get_stats().await),
        None => None,
    };

    Json(StatusResponse {
        status: health.as_str().to_string(),
        detail: health.detail().map(str::to_string),
        timestamp: chrono::Utc::now(),
        version: VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        pool_count: snapshot.len(),
        snapshot_generation: snapshot.generation(),
        snapshot_published_at: snapshot.published_at(),
        refresh,
        upstream,
    })
}
