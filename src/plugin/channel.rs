use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    ChannelFeatures, ChannelItemInfo, ChannelItemQuery, ChannelItemResult, ChannelSearchQuery,
    DynamicImageResponse, ImageType,
};
use crate::services::settings::SettingsError;
use crate::services::trailers::TrailerError;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("unsupported image type: {0}")]
    UnsupportedImageType(ImageType),
    #[error("{0} is not supported by this channel")]
    NotSupported(&'static str),
    #[error(transparent)]
    Download(#[from] TrailerError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Host contract for a content channel
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Bumped whenever the item shape changes so the host drops its cache
    fn data_version(&self) -> &str;

    fn home_page_url(&self) -> &str;

    fn features(&self) -> ChannelFeatures;

    fn supported_images(&self) -> Vec<ImageType>;

    fn is_enabled_for(&self, _user_id: &str) -> bool {
        true
    }

    async fn get_channel_items(
        &self,
        query: &ChannelItemQuery,
    ) -> Result<ChannelItemResult, ChannelError>;

    async fn get_all_media(
        &self,
        query: &ChannelItemQuery,
    ) -> Result<ChannelItemResult, ChannelError>;

    async fn get_channel_image(
        &self,
        image_type: ImageType,
    ) -> Result<DynamicImageResponse, ChannelError>;

    async fn search(
        &self,
        _query: &ChannelSearchQuery,
    ) -> Result<Vec<ChannelItemInfo>, ChannelError> {
        Err(ChannelError::NotSupported("search"))
    }
}
