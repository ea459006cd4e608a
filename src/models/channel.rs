use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image slots a channel can fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageType {
    Primary,
    Thumb,
    Backdrop,
    Logo,
    Banner,
    Art,
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageType::Primary => write!(f, "primary"),
            ImageType::Thumb => write!(f, "thumb"),
            ImageType::Backdrop => write!(f, "backdrop"),
            ImageType::Logo => write!(f, "logo"),
            ImageType::Banner => write!(f, "banner"),
            ImageType::Art => write!(f, "art"),
        }
    }
}

impl std::str::FromStr for ImageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(ImageType::Primary),
            "thumb" => Ok(ImageType::Thumb),
            "backdrop" => Ok(ImageType::Backdrop),
            "logo" => Ok(ImageType::Logo),
            "banner" => Ok(ImageType::Banner),
            "art" => Ok(ImageType::Art),
            other => Err(format!("Unknown image type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpg,
    Png,
}

impl ImageFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// Image returned for a channel slot
#[derive(Debug, Clone)]
pub struct DynamicImageResponse {
    pub format: ImageFormat,
    pub has_image: bool,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelMediaContentType {
    Clip,
    Podcast,
    Trailer,
    Movie,
    Episode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelMediaType {
    Audio,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelItemType {
    Media,
    Folder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonKind {
    Actor,
    Director,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PersonKind,
}

/// Downloadable source of a channel item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMediaInfo {
    pub path: String,
}

/// Item listed by a content channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItemInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ChannelItemType,
    pub content_type: ChannelMediaContentType,
    pub media_type: ChannelMediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub studios: Vec<String>,
    #[serde(default)]
    pub people: Vec<PersonInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premiere_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_time_ticks: Option<i64>,
    pub is_infinite_stream: bool,
    pub media_sources: Vec<ChannelMediaInfo>,
}

/// Page of channel items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItemResult {
    pub items: Vec<ChannelItemInfo>,
    pub total_record_count: usize,
    /// How long the host may cache this result
    pub cache_length_secs: u64,
}

/// Paging window requested by the host
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItemQuery {
    #[serde(default)]
    pub start_index: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSearchQuery {
    pub search_term: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelFeatures {
    pub can_search: bool,
    pub can_get_all_media: bool,
    pub content_types: Vec<ChannelMediaContentType>,
    pub media_types: Vec<ChannelMediaType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_type_parse() {
        assert_eq!("Primary".parse::<ImageType>(), Ok(ImageType::Primary));
        assert_eq!("thumb".parse::<ImageType>(), Ok(ImageType::Thumb));
        assert!("poster".parse::<ImageType>().is_err());
    }

    #[test]
    fn test_image_type_display_round_trip() {
        for kind in [ImageType::Primary, ImageType::Backdrop, ImageType::Art] {
            assert_eq!(kind.to_string().parse::<ImageType>(), Ok(kind));
        }
    }
}
