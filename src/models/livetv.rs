use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel kind reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelType {
    #[serde(rename = "TV")]
    Tv,
    Radio,
}

/// Live TV channel as the host lists it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub id: String,
    pub number: String,
    pub name: String,
    pub channel_type: ChannelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub has_image: bool,
    /// Station id on the guide service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_sign: Option<String>,
    pub is_hd: bool,
}

/// One airing on a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramInfo {
    pub id: String,
    pub channel_id: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_title: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_air_date: Option<DateTime<Utc>>,
    pub is_movie: bool,
    pub is_series: bool,
    pub is_sports: bool,
    pub is_news: bool,
    pub is_kids: bool,
    pub is_repeat: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaProtocol {
    Http,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaStreamType {
    Video,
    Audio,
}

/// Elementary stream inside a media source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStream {
    #[serde(rename = "type")]
    pub kind: MediaStreamType,
    /// -1 when the index inside the container is unknown
    pub index: i32,
}

impl MediaStream {
    pub fn unknown_index(kind: MediaStreamType) -> Self {
        Self { kind, index: -1 }
    }
}

/// Playable source handed to the host player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSourceInfo {
    pub id: String,
    pub path: String,
    pub protocol: MediaProtocol,
    pub media_streams: Vec<MediaStream>,
    pub is_infinite_stream: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiveTvTunerStatus {
    Available,
    LiveTv,
    RecordingTv,
    Disabled,
}

/// Physical tuner as reported in the service status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTvTunerInfo {
    pub id: String,
    pub name: String,
    pub source_type: String,
    pub status: LiveTvTunerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub clients: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTvServiceStatusInfo {
    pub has_update_available: bool,
    pub version: String,
    pub tuners: Vec<LiveTvTunerInfo>,
}

// ============================================================================
// Recording types (only listed, never produced by the tuner backend)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingInfo {
    pub id: String,
    pub channel_id: String,
    pub name: String,
    pub path: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerInfo {
    pub id: String,
    pub channel_id: String,
    pub program_id: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesTimerInfo {
    pub id: String,
    pub channel_id: String,
    pub program_id: String,
    pub name: String,
    pub record_any_channel: bool,
    pub record_any_time: bool,
}
