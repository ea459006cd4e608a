//! Live TV Routes
//!
//! Thin HTTP surface over [`LiveTvService`] so a host can drive the backend
//! out of process.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::{live_tv_error, ApiError};
use crate::models::TimerInfo;
use crate::plugin::LiveTvService;
use crate::AppState;

/// Default guide window when the caller gives no end
const DEFAULT_PROGRAM_WINDOW_HOURS: i64 = 24;

#[derive(Deserialize, Default)]
pub struct ProgramsQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    pub stream_id: Option<String>,
}

/// GET /api/livetv/channels
pub async fn get_channels(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let channels = state.live_tv.get_channels().await.map_err(live_tv_error)?;
    Ok(Json(channels))
}

/// GET /api/livetv/channels/:id/programs?start=&end=
pub async fn get_programs(
    State(state): State<Arc<AppState>>,
    Path(channel_id): Path<String>,
    Query(query): Query<ProgramsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let start = query.start.unwrap_or_else(Utc::now);
    let end = query
        .end
        .unwrap_or_else(|| start + Duration::hours(DEFAULT_PROGRAM_WINDOW_HOURS));

    let programs = state
        .live_tv
        .get_programs(&channel_id, start, end)
        .await
        .map_err(live_tv_error)?;
    Ok(Json(programs))
}

/// GET /api/livetv/channels/:id/stream
pub async fn get_channel_stream(
    State(state): State<Arc<AppState>>,
    Path(channel_id): Path<String>,
    Query(query): Query<StreamQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let source = state
        .live_tv
        .get_channel_stream(&channel_id, query.stream_id.as_deref())
        .await
        .map_err(live_tv_error)?;
    Ok(Json(source))
}

/// DELETE /api/livetv/streams/:id
pub async fn close_live_stream(
    State(state): State<Arc<AppState>>,
    Path(stream_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .live_tv
        .close_live_stream(&stream_id)
        .await
        .map_err(live_tv_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/livetv/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let status = state.live_tv.get_status_info().await.map_err(live_tv_error)?;
    Ok(Json(status))
}

pub async fn get_recordings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let recordings = state.live_tv.get_recordings().await.map_err(live_tv_error)?;
    Ok(Json(recordings))
}

pub async fn get_timers(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let timers = state.live_tv.get_timers().await.map_err(live_tv_error)?;
    Ok(Json(timers))
}

pub async fn get_series_timers(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let timers = state.live_tv.get_series_timers().await.map_err(live_tv_error)?;
    Ok(Json(timers))
}

/// POST /api/livetv/timers
pub async fn create_timer(
    State(state): State<Arc<AppState>>,
    Json(timer): Json<TimerInfo>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .live_tv
        .create_timer(timer)
        .await
        .map_err(live_tv_error)?;
    Ok(StatusCode::CREATED)
}

/// POST /api/livetv/refresh - re-read settings now
pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.live_tv.refresh_now().await.map_err(live_tv_error)?;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use crate::routes::{router, test_app};
    use crate::services::settings::PluginConfig;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_channels_empty_without_lineup() {
        let app = router(test_app::state(PluginConfig::default(), test_app::UNREACHABLE).await);

        let response = app.oneshot(get("/api/livetv/channels")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(test_app::body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_stream_route() {
        let mut config = PluginConfig::default();
        config.live_tv.tuner_url = "http://10.0.0.5:5004".into();
        let app = router(test_app::state(config, test_app::UNREACHABLE).await);

        let response = app
            .clone()
            .oneshot(get("/api/livetv/channels/1003/stream"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = test_app::body_json(response).await;
        assert_eq!(body["id"], "1");
        assert_eq!(body["path"], "http://10.0.0.5:5004/auto/v1003");

        let response = app
            .oneshot(
                Request::delete("/api/livetv/streams/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_status_without_tuner_is_bad_request() {
        let app = router(test_app::state(PluginConfig::default(), test_app::UNREACHABLE).await);

        let response = app.oneshot(get("/api/livetv/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(test_app::body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unreachable_tuner_is_bad_gateway() {
        let mut config = PluginConfig::default();
        config.live_tv.tuner_url = test_app::UNREACHABLE.into();
        let app = router(test_app::state(config, test_app::UNREACHABLE).await);

        let response = app.oneshot(get("/api/livetv/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_timers_listing_and_creation() {
        let app = router(test_app::state(PluginConfig::default(), test_app::UNREACHABLE).await);

        let response = app.clone().oneshot(get("/api/livetv/timers")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(test_app::body_json(response).await, serde_json::json!([]));

        let timer = serde_json::json!({
            "id": "t1",
            "channelId": "2.1",
            "programId": "EP1",
            "name": "News",
            "startDate": "2024-01-01T18:00:00Z",
            "endDate": "2024-01-01T18:30:00Z"
        });
        let response = app
            .oneshot(
                Request::post("/api/livetv/timers")
                    .header("content-type", "application/json")
                    .body(Body::from(timer.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_refresh_route() {
        let app = router(test_app::state(PluginConfig::default(), test_app::UNREACHABLE).await);

        let response = app
            .oneshot(
                Request::post("/api/livetv/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(test_app::body_json(response).await["outcome"], "applied");
    }
}
