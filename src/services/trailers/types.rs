use chrono::{DateTime, Utc};

use crate::models::PersonInfo;

/// One catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct TrailerRecord {
    pub name: String,
    pub trailer_url: String,
    pub image_url: Option<String>,
    pub hd_image_url: Option<String>,
    pub official_rating: Option<String>,
    pub community_rating: Option<f32>,
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    /// Cast followed by directors
    pub people: Vec<PersonInfo>,
    pub overview: Option<String>,
    pub post_date: DateTime<Utc>,
    pub premiere_date: Option<DateTime<Utc>>,
    pub production_year: Option<i32>,
    /// Trailer length in 100ns ticks
    pub run_time_ticks: Option<i64>,
}

impl TrailerRecord {
    /// Poster to show, preferring the high resolution one
    pub fn best_image_url(&self) -> Option<&str> {
        self.hd_image_url
            .as_deref()
            .or(self.image_url.as_deref())
    }
}
