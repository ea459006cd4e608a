use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sha1::{Digest, Sha1};
use std::sync::Arc;
use tracing::debug;

use super::downloader::TrailerListingDownloader;
use super::types::TrailerRecord;
use crate::models::{
    ChannelFeatures, ChannelItemInfo, ChannelItemQuery, ChannelItemResult, ChannelItemType,
    ChannelMediaContentType, ChannelMediaInfo, ChannelMediaType, DynamicImageResponse,
    ImageFormat, ImageType,
};
use crate::plugin::{Channel, ChannelError};
use crate::services::settings::ConfigStore;

pub const CHANNEL_NAME: &str = "Trailers";
pub const HOME_PAGE_URL: &str = "http://mediabrowser3.com";

/// Bump when the item shape changes
const DATA_VERSION: &str = "5";

/// How long the host may cache a listing
const CACHE_LENGTH_SECS: u64 = 3 * 24 * 60 * 60;

static PRIMARY_IMAGE: &[u8] = include_bytes!("../../../assets/images/primary.jpg");
static THUMB_IMAGE: &[u8] = include_bytes!("../../../assets/images/thumb.jpg");

/// Content channel listing recent movie trailers
pub struct TrailerChannel {
    downloader: TrailerListingDownloader,
    store: Arc<dyn ConfigStore>,
}

impl TrailerChannel {
    pub fn new(downloader: TrailerListingDownloader, store: Arc<dyn ConfigStore>) -> Self {
        Self { downloader, store }
    }

    async fn list(&self, query: &ChannelItemQuery) -> Result<ChannelItemResult, ChannelError> {
        let max_age_days = self.store.load().await?.config.trailers.max_trailer_age_days;
        let trailers = self.downloader.get_trailer_list().await?;

        let now = Utc::now();
        let items: Vec<ChannelItemInfo> = trailers
            .iter()
            .filter(|t| is_recent(t, now, max_age_days))
            .map(channel_item)
            .collect();
        debug!(
            "Trailer channel: {} of {} trailers within age limit {:?}",
            items.len(),
            trailers.len(),
            max_age_days
        );

        Ok(paginate(items, query))
    }
}

/// Posted within `max_age_days` of `now`; everything passes when unset
pub fn is_recent(trailer: &TrailerRecord, now: DateTime<Utc>, max_age_days: Option<u32>) -> bool {
    match max_age_days {
        None => true,
        Some(days) => now - trailer.post_date <= Duration::days(i64::from(days)),
    }
}

/// Stable item id derived from the trailer URL
pub fn trailer_id(trailer_url: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(trailer_url.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn channel_item(trailer: &TrailerRecord) -> ChannelItemInfo {
    ChannelItemInfo {
        id: trailer_id(&trailer.trailer_url),
        name: trailer.name.clone(),
        item_type: ChannelItemType::Media,
        content_type: ChannelMediaContentType::Trailer,
        media_type: ChannelMediaType::Video,
        image_url: trailer.best_image_url().map(str::to_string),
        overview: trailer.overview.clone(),
        genres: trailer.genres.clone(),
        studios: trailer.studios.clone(),
        people: trailer.people.clone(),
        official_rating: trailer.official_rating.clone(),
        community_rating: trailer.community_rating,
        premiere_date: trailer.premiere_date,
        production_year: trailer.production_year,
        run_time_ticks: trailer.run_time_ticks,
        is_infinite_stream: false,
        media_sources: vec![ChannelMediaInfo {
            path: trailer.trailer_url.clone(),
        }],
    }
}

fn paginate(items: Vec<ChannelItemInfo>, query: &ChannelItemQuery) -> ChannelItemResult {
    let total_record_count = items.len();
    let items = items
        .into_iter()
        .skip(query.start_index.unwrap_or(0))
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();

    ChannelItemResult {
        items,
        total_record_count,
        cache_length_secs: CACHE_LENGTH_SECS,
    }
}

#[async_trait]
impl Channel for TrailerChannel {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    fn data_version(&self) -> &str {
        DATA_VERSION
    }

    fn home_page_url(&self) -> &str {
        HOME_PAGE_URL
    }

    fn features(&self) -> ChannelFeatures {
        ChannelFeatures {
            can_search: false,
            can_get_all_media: true,
            content_types: vec![ChannelMediaContentType::Trailer],
            media_types: vec![ChannelMediaType::Video],
        }
    }

    fn supported_images(&self) -> Vec<ImageType> {
        vec![ImageType::Thumb, ImageType::Primary]
    }

    async fn get_channel_items(
        &self,
        query: &ChannelItemQuery,
    ) -> Result<ChannelItemResult, ChannelError> {
        self.list(query).await
    }

    async fn get_all_media(
        &self,
        query: &ChannelItemQuery,
    ) -> Result<ChannelItemResult, ChannelError> {
        self.list(query).await
    }

    async fn get_channel_image(
        &self,
        image_type: ImageType,
    ) -> Result<DynamicImageResponse, ChannelError> {
        let data = match image_type {
            ImageType::Primary => PRIMARY_IMAGE,
            ImageType::Thumb => THUMB_IMAGE,
            other => return Err(ChannelError::UnsupportedImageType(other)),
        };

        Ok(DynamicImageResponse {
            format: ImageFormat::Jpg,
            has_image: true,
            data: data.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelSearchQuery;
    use crate::services::settings::{MemoryConfigStore, PluginConfig};
    use crate::services::test_support;
    use axum::{routing::get, Router};

    fn record(url: &str, post_date: DateTime<Utc>) -> TrailerRecord {
        TrailerRecord {
            name: url.to_string(),
            trailer_url: url.to_string(),
            image_url: Some("http://img/poster.jpg".into()),
            hd_image_url: None,
            official_rating: None,
            community_rating: None,
            genres: Vec::new(),
            studios: Vec::new(),
            people: Vec::new(),
            overview: None,
            post_date,
            premiere_date: None,
            production_year: None,
            run_time_ticks: None,
        }
    }

    fn catalog(now: DateTime<Utc>) -> String {
        let entry = |title: &str, days_ago: i64| {
            format!(
                "<movieinfo><info><title>{0}</title><postdate>{1}</postdate></info>\
                 <poster><location>http://img/{0}.jpg</location></poster>\
                 <preview><large>http://video/{0}.mov</large></preview></movieinfo>",
                title,
                (now - Duration::days(days_ago)).format("%Y-%m-%d")
            )
        };
        format!(
            "<records>{}{}{}</records>",
            entry("new", 2),
            entry("recent", 10),
            entry("old", 60)
        )
    }

    async fn channel_with(max_age_days: Option<u32>) -> TrailerChannel {
        let body = catalog(Utc::now());
        let app = Router::new().route("/current.xml", get(move || async move { body }));
        let base = test_support::serve(app).await;

        let mut config = PluginConfig::default();
        config.trailers.max_trailer_age_days = max_age_days;
        let store = Arc::new(MemoryConfigStore::new(config));
        let downloader =
            TrailerListingDownloader::new(test_support::client(), format!("{}/current.xml", base));
        TrailerChannel::new(downloader, store)
    }

    #[test]
    fn test_is_recent() {
        let now = Utc::now();
        let week_old = record("a", now - Duration::days(7));

        assert!(is_recent(&week_old, now, None));
        assert!(is_recent(&week_old, now, Some(7)));
        assert!(!is_recent(&week_old, now, Some(6)));
    }

    #[test]
    fn test_trailer_id_is_stable() {
        let id = trailer_id("http://video/a.mov");

        assert_eq!(id.len(), 40);
        assert_eq!(id, trailer_id("http://video/a.mov"));
        assert_ne!(id, trailer_id("http://video/b.mov"));
    }

    #[test]
    fn test_channel_item_mapping() {
        let mut trailer = record("http://video/a.mov", Utc::now());
        trailer.hd_image_url = Some("http://img/poster-xl.jpg".into());
        let item = channel_item(&trailer);

        assert_eq!(item.id, trailer_id("http://video/a.mov"));
        assert_eq!(item.content_type, ChannelMediaContentType::Trailer);
        assert_eq!(item.media_type, ChannelMediaType::Video);
        assert_eq!(item.item_type, ChannelItemType::Media);
        assert_eq!(item.image_url.as_deref(), Some("http://img/poster-xl.jpg"));
        assert_eq!(item.media_sources.len(), 1);
        assert_eq!(item.media_sources[0].path, "http://video/a.mov");
    }

    #[tokio::test]
    async fn test_items_filtered_by_age() {
        let channel = channel_with(Some(30)).await;
        let result = channel
            .get_channel_items(&ChannelItemQuery::default())
            .await
            .unwrap();

        let names: Vec<&str> = result.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["new", "recent"]);
        assert_eq!(result.total_record_count, 2);
        assert_eq!(result.cache_length_secs, 3 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn test_all_media_paginates() {
        let channel = channel_with(None).await;
        let query = ChannelItemQuery {
            start_index: Some(1),
            limit: Some(1),
            user_id: None,
        };
        let result = channel.get_all_media(&query).await.unwrap();

        assert_eq!(result.total_record_count, 3);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name, "recent");
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let store = Arc::new(MemoryConfigStore::new(PluginConfig::default()));
        let downloader = TrailerListingDownloader::new(test_support::client(), "http://127.0.0.1:9");
        let channel = TrailerChannel::new(downloader, store);

        assert!(matches!(
            channel.get_channel_items(&ChannelItemQuery::default()).await,
            Err(ChannelError::Download(_))
        ));
    }

    #[tokio::test]
    async fn test_channel_images() {
        let store = Arc::new(MemoryConfigStore::new(PluginConfig::default()));
        let downloader = TrailerListingDownloader::new(test_support::client(), "http://127.0.0.1:9");
        let channel = TrailerChannel::new(downloader, store);

        let primary = channel.get_channel_image(ImageType::Primary).await.unwrap();
        assert_eq!(primary.format, ImageFormat::Jpg);
        assert!(primary.has_image);
        assert_eq!(&primary.data[..2], &[0xFF, 0xD8]);

        let thumb = channel.get_channel_image(ImageType::Thumb).await.unwrap();
        assert_eq!(&thumb.data[..2], &[0xFF, 0xD8]);
        assert_ne!(primary.data, thumb.data);

        assert!(matches!(
            channel.get_channel_image(ImageType::Backdrop).await,
            Err(ChannelError::UnsupportedImageType(ImageType::Backdrop))
        ));
    }

    #[tokio::test]
    async fn test_channel_metadata() {
        let store = Arc::new(MemoryConfigStore::new(PluginConfig::default()));
        let downloader = TrailerListingDownloader::new(test_support::client(), "http://127.0.0.1:9");
        let channel = TrailerChannel::new(downloader, store);

        assert_eq!(channel.name(), "Trailers");
        assert_eq!(channel.data_version(), "5");
        assert!(channel.is_enabled_for("any-user"));
        assert_eq!(channel.supported_images(), vec![ImageType::Thumb, ImageType::Primary]);

        let features = channel.features();
        assert!(!features.can_search);
        assert!(features.can_get_all_media);
        assert_eq!(features.content_types, vec![ChannelMediaContentType::Trailer]);

        let search = ChannelSearchQuery {
            search_term: "batman".into(),
            user_id: None,
        };
        assert!(matches!(
            channel.search(&search).await,
            Err(ChannelError::NotSupported(_))
        ));
    }
}
