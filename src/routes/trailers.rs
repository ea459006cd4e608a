use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::{channel_error, error_response, ApiError};
use crate::models::{ChannelFeatures, ChannelItemQuery, ImageType};
use crate::plugin::Channel;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDescription {
    pub name: String,
    pub data_version: String,
    pub home_page_url: String,
    pub features: ChannelFeatures,
    pub supported_images: Vec<ImageType>,
}

/// GET /api/channels/trailers?startIndex=&limit=
pub async fn get_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChannelItemQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .trailers
        .get_channel_items(&query)
        .await
        .map_err(channel_error)?;
    Ok(Json(result))
}

/// GET /api/channels/trailers/all
pub async fn get_all_media(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChannelItemQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .trailers
        .get_all_media(&query)
        .await
        .map_err(channel_error)?;
    Ok(Json(result))
}

/// GET /api/channels/trailers/features
pub async fn get_features(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let channel = &state.trailers;
    Json(ChannelDescription {
        name: channel.name().to_string(),
        data_version: channel.data_version().to_string(),
        home_page_url: channel.home_page_url().to_string(),
        features: channel.features(),
        supported_images: channel.supported_images(),
    })
}

/// GET /api/channels/trailers/images/:type
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(image_type): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let image_type: ImageType = image_type
        .parse()
        .map_err(|e: String| error_response(StatusCode::BAD_REQUEST, e))?;

    let image = state
        .trailers
        .get_channel_image(image_type)
        .await
        .map_err(channel_error)?;

    Ok((
        [(header::CONTENT_TYPE, image.format.content_type())],
        image.data,
    ))
}
