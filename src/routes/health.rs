use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;

use crate::plugin::{Channel, LiveTvService};
use crate::services::settings::ConfigStore;
use crate::AppState;

/// Root endpoint - basic status
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "TV & Trailers Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "runtime": "rust"
    }))
}

/// Live TV backend summary
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LiveTvHealth {
    name: String,
    tuner_configured: bool,
    guide_account: bool,
    lineup_selected: bool,
}

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    environment: String,
    uptime: u64,
    settings: bool,
    live_tv: LiveTvHealth,
    channels: Vec<String>,
}

/// GET /health - Advanced health check
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    // Settings store is the only local dependency
    let settings_ok = state.store.last_modified().await.is_ok();

    let backends = state.live_tv.backends().await;
    let live_tv = LiveTvHealth {
        name: state.live_tv.name().to_string(),
        tuner_configured: backends.tuner.has_address(),
        guide_account: backends.guide.credentials().has_account(),
        lineup_selected: backends.guide.has_lineup(),
    };

    let health = HealthResponse {
        status: if settings_ok { "ok" } else { "degraded" }.to_string(),
        environment: state.config.app_env.clone(),
        uptime,
        settings: settings_ok,
        live_tv,
        channels: vec![state.trailers.name().to_string()],
    };

    Json(health)
}

/// GET /metrics - Prometheus metrics
pub async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                b"Internal Server Error".to_vec(),
            )
        }
    }
}

/// Readiness probe (for Kubernetes)
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.load().await {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!("Settings store not readable: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "not ready - settings unreadable")
        }
    }
}

/// Liveness probe (for Kubernetes)
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}
