pub mod health;
pub mod livetv;
pub mod settings;
pub mod trailers;

use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::plugin::{ChannelError, LiveTvError};
use crate::services::guide::GuideError;
use crate::AppState;

/// Error body shared by every handler
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

pub fn live_tv_error(err: LiveTvError) -> ApiError {
    let status = match &err {
        LiveTvError::ConfigurationMissing(_) => StatusCode::BAD_REQUEST,
        LiveTvError::DeviceUnreachable(_) => StatusCode::BAD_GATEWAY,
        LiveTvError::Guide(GuideError::MissingCredentials | GuideError::NoLineup) => {
            StatusCode::BAD_REQUEST
        }
        LiveTvError::Guide(_) => StatusCode::BAD_GATEWAY,
        LiveTvError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LiveTvError::NotSupported(_) => StatusCode::NOT_IMPLEMENTED,
    };

    if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
        tracing::error!("Live TV error: {}", err);
    } else {
        tracing::debug!("Live TV request rejected: {}", err);
    }
    error_response(status, err.to_string())
}

pub fn channel_error(err: ChannelError) -> ApiError {
    let status = match &err {
        ChannelError::UnsupportedImageType(_) => StatusCode::BAD_REQUEST,
        ChannelError::NotSupported(_) => StatusCode::NOT_IMPLEMENTED,
        ChannelError::Download(_) => StatusCode::BAD_GATEWAY,
        ChannelError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
        tracing::error!("Trailer channel error: {}", err);
    }
    error_response(status, err.to_string())
}

/// Route table
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/ready", get(health::ready))
        .route("/live", get(health::live))
        // Plugin settings
        .route(
            "/api/settings",
            get(settings::get_settings).put(settings::put_settings),
        )
        // Live TV
        .route("/api/livetv/channels", get(livetv::get_channels))
        .route(
            "/api/livetv/channels/:id/programs",
            get(livetv::get_programs),
        )
        .route(
            "/api/livetv/channels/:id/stream",
            get(livetv::get_channel_stream),
        )
        .route(
            "/api/livetv/streams/:id",
            delete(livetv::close_live_stream),
        )
        .route("/api/livetv/status", get(livetv::get_status))
        .route("/api/livetv/recordings", get(livetv::get_recordings))
        .route(
            "/api/livetv/timers",
            get(livetv::get_timers).post(livetv::create_timer),
        )
        .route("/api/livetv/series-timers", get(livetv::get_series_timers))
        .route("/api/livetv/refresh", post(livetv::refresh))
        // Trailer channel
        .route("/api/channels/trailers", get(trailers::get_items))
        .route("/api/channels/trailers/all", get(trailers::get_all_media))
        .route("/api/channels/trailers/features", get(trailers::get_features))
        .route(
            "/api/channels/trailers/images/:type",
            get(trailers::get_image),
        )
        .with_state(state)
}
