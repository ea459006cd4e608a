use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    ChannelInfo, DynamicImageResponse, LiveTvServiceStatusInfo, MediaSourceInfo, ProgramInfo,
    RecordingInfo, SeriesTimerInfo, TimerInfo,
};
use crate::services::guide::GuideError;
use crate::services::settings::SettingsError;
use crate::services::tuner::TunerError;

#[derive(Debug, Error)]
pub enum LiveTvError {
    /// A required setting is absent
    #[error("{0}")]
    ConfigurationMissing(String),
    /// The tuner did not answer or did not identify itself
    #[error("{0}")]
    DeviceUnreachable(String),
    #[error(transparent)]
    Guide(#[from] GuideError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Optional contract operation this service does not offer
    #[error("{0} is not supported by this live TV service")]
    NotSupported(&'static str),
}

impl From<TunerError> for LiveTvError {
    fn from(err: TunerError) -> Self {
        match err {
            TunerError::MissingAddress => LiveTvError::ConfigurationMissing(err.to_string()),
            other => LiveTvError::DeviceUnreachable(other.to_string()),
        }
    }
}

/// Host contract for a live TV backend
///
/// Required operations have no default. Optional operations default to
/// [`LiveTvError::NotSupported`]; list operations default to empty lists.
#[async_trait]
pub trait LiveTvService: Send + Sync {
    fn name(&self) -> &str;

    fn home_page_url(&self) -> String;

    async fn get_channels(&self) -> Result<Vec<ChannelInfo>, LiveTvError>;

    async fn get_programs(
        &self,
        channel_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProgramInfo>, LiveTvError>;

    async fn get_channel_stream(
        &self,
        channel_id: &str,
        stream_id: Option<&str>,
    ) -> Result<MediaSourceInfo, LiveTvError>;

    async fn close_live_stream(&self, stream_id: &str) -> Result<(), LiveTvError>;

    async fn get_status_info(&self) -> Result<LiveTvServiceStatusInfo, LiveTvError>;

    async fn get_recordings(&self) -> Result<Vec<RecordingInfo>, LiveTvError> {
        Ok(Vec::new())
    }

    async fn get_timers(&self) -> Result<Vec<TimerInfo>, LiveTvError> {
        Ok(Vec::new())
    }

    async fn get_series_timers(&self) -> Result<Vec<SeriesTimerInfo>, LiveTvError> {
        Ok(Vec::new())
    }

    async fn create_timer(&self, _timer: TimerInfo) -> Result<(), LiveTvError> {
        Err(LiveTvError::NotSupported("create_timer"))
    }

    async fn update_timer(&self, _timer: TimerInfo) -> Result<(), LiveTvError> {
        Err(LiveTvError::NotSupported("update_timer"))
    }

    async fn cancel_timer(&self, _timer_id: &str) -> Result<(), LiveTvError> {
        Err(LiveTvError::NotSupported("cancel_timer"))
    }

    async fn create_series_timer(&self, _timer: SeriesTimerInfo) -> Result<(), LiveTvError> {
        Err(LiveTvError::NotSupported("create_series_timer"))
    }

    async fn update_series_timer(&self, _timer: SeriesTimerInfo) -> Result<(), LiveTvError> {
        Err(LiveTvError::NotSupported("update_series_timer"))
    }

    async fn cancel_series_timer(&self, _timer_id: &str) -> Result<(), LiveTvError> {
        Err(LiveTvError::NotSupported("cancel_series_timer"))
    }

    async fn get_new_timer_defaults(
        &self,
        _program: Option<ProgramInfo>,
    ) -> Result<SeriesTimerInfo, LiveTvError> {
        Err(LiveTvError::NotSupported("get_new_timer_defaults"))
    }

    async fn delete_recording(&self, _recording_id: &str) -> Result<(), LiveTvError> {
        Err(LiveTvError::NotSupported("delete_recording"))
    }

    async fn get_recording_stream(
        &self,
        _recording_id: &str,
        _stream_id: Option<&str>,
    ) -> Result<MediaSourceInfo, LiveTvError> {
        Err(LiveTvError::NotSupported("get_recording_stream"))
    }

    async fn get_channel_stream_media_sources(
        &self,
        _channel_id: &str,
    ) -> Result<Vec<MediaSourceInfo>, LiveTvError> {
        Err(LiveTvError::NotSupported("get_channel_stream_media_sources"))
    }

    async fn get_recording_stream_media_sources(
        &self,
        _recording_id: &str,
    ) -> Result<Vec<MediaSourceInfo>, LiveTvError> {
        Err(LiveTvError::NotSupported("get_recording_stream_media_sources"))
    }

    async fn get_channel_image(
        &self,
        _channel_id: &str,
    ) -> Result<DynamicImageResponse, LiveTvError> {
        Err(LiveTvError::NotSupported("get_channel_image"))
    }

    async fn get_program_image(
        &self,
        _program_id: &str,
        _channel_id: &str,
    ) -> Result<DynamicImageResponse, LiveTvError> {
        Err(LiveTvError::NotSupported("get_program_image"))
    }

    async fn get_recording_image(
        &self,
        _recording_id: &str,
    ) -> Result<DynamicImageResponse, LiveTvError> {
        Err(LiveTvError::NotSupported("get_recording_image"))
    }

    async fn record_live_stream(&self, _stream_id: &str) -> Result<(), LiveTvError> {
        Err(LiveTvError::NotSupported("record_live_stream"))
    }

    async fn reset_tuner(&self, _tuner_id: &str) -> Result<(), LiveTvError> {
        Err(LiveTvError::NotSupported("reset_tuner"))
    }
}
