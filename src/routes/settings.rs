//! Plugin settings routes
//!
//! The settings UI reads and replaces the whole configuration; the live TV
//! refresh loop notices the new version on its next tick.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use super::{error_response, ApiError};
use crate::services::settings::{ConfigStore, PluginConfig};
use crate::AppState;

/// GET /api/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.store.load().await.map_err(|e| {
        tracing::error!("Failed to read settings: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(snapshot.config))
}

/// PUT /api/settings
pub async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(config): Json<PluginConfig>,
) -> Result<impl IntoResponse, ApiError> {
    let version = state.store.save(config).await.map_err(|e| {
        tracing::error!("Failed to write settings: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    tracing::info!("Plugin settings saved (version {})", version);

    Ok(Json(serde_json::json!({ "version": version })))
}
