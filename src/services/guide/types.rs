//! Guide API Types
//!
//! Request and response types for the EPG service's JSON API.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Account credentials for the guide service
#[derive(Debug, Clone, Default)]
pub struct GuideCredentials {
    pub username: String,
    /// SHA1 hex of the account password
    pub password_hash: String,
    /// Selected lineup id (empty when none picked yet)
    pub lineup: String,
}

impl GuideCredentials {
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        lineup: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            lineup: lineup.into(),
        }
    }

    pub fn has_account(&self) -> bool {
        !self.username.trim().is_empty()
    }

    pub fn has_lineup(&self) -> bool {
        !self.lineup.trim().is_empty()
    }
}

// ============================================================================
// Authentication
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Status envelope carried by error responses
#[derive(Debug, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Lineups & Headends
// ============================================================================

/// Lineup attached to the account or offered by a headend
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Lineup {
    #[serde(alias = "ID")]
    pub lineup: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub transport: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default, rename = "isDeleted")]
    pub is_deleted: Option<bool>,
}

/// Response of GET /lineups
#[derive(Debug, Deserialize, Clone)]
pub struct LineupsResponse {
    #[serde(default)]
    pub lineups: Vec<Lineup>,
}

/// Headend serving a postal code
#[derive(Debug, Deserialize, Clone)]
pub struct Headend {
    pub headend: String,
    #[serde(default)]
    pub transport: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub lineups: Vec<Lineup>,
}

// ============================================================================
// Lineup map (channel -> station)
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMapping {
    #[serde(rename = "stationID")]
    pub station_id: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub atsc_major: Option<u32>,
    #[serde(default)]
    pub atsc_minor: Option<u32>,
    #[serde(default)]
    pub uhf_vhf: Option<u32>,
}

impl ChannelMapping {
    /// Channel number in the tuner's notation (`5.1` for ATSC, `2` otherwise)
    pub fn channel_number(&self) -> Option<String> {
        match (self.atsc_major, self.atsc_minor) {
            (Some(major), Some(minor)) => Some(format!("{}.{}", major, minor)),
            _ => self
                .channel
                .as_deref()
                .map(normalize_channel_number)
                .or_else(|| self.uhf_vhf.map(|n| n.to_string())),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StationLogo {
    #[serde(rename = "URL")]
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Station {
    #[serde(rename = "stationID")]
    pub station_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub callsign: String,
    #[serde(default, rename = "stationLogo")]
    pub station_logos: Vec<StationLogo>,
    #[serde(default)]
    pub logo: Option<StationLogo>,
}

impl Station {
    pub fn logo_url(&self) -> Option<&str> {
        self.logo
            .as_ref()
            .or_else(|| self.station_logos.first())
            .map(|l| l.url.as_str())
    }
}

/// Response of GET /lineups/{lineup}
#[derive(Debug, Deserialize, Clone)]
pub struct LineupMap {
    #[serde(default)]
    pub map: Vec<ChannelMapping>,
    #[serde(default)]
    pub stations: Vec<Station>,
}

// ============================================================================
// Schedules & Programs
// ============================================================================

/// Body entry of POST /schedules
#[derive(Debug, Serialize)]
pub struct ScheduleRequest {
    #[serde(rename = "stationID")]
    pub station_id: String,
    pub date: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Airing {
    #[serde(rename = "programID")]
    pub program_id: String,
    pub air_date_time: DateTime<Utc>,
    /// Seconds
    pub duration: i64,
    #[serde(default)]
    pub new: Option<bool>,
}

impl Airing {
    /// Scheduled end; `None` when the duration is out of range
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        Duration::try_seconds(self.duration)
            .and_then(|length| self.air_date_time.checked_add_signed(length))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StationSchedule {
    #[serde(rename = "stationID")]
    pub station_id: String,
    #[serde(default)]
    pub programs: Vec<Airing>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProgramTitle {
    pub title120: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProgramDescription {
    #[serde(default, rename = "descriptionLanguage")]
    pub language: Option<String>,
    pub description: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProgramDescriptions {
    #[serde(default)]
    pub description1000: Vec<ProgramDescription>,
    #[serde(default)]
    pub description100: Vec<ProgramDescription>,
}

impl ProgramDescriptions {
    /// Longest available description
    pub fn best(&self) -> Option<&str> {
        self.description1000
            .first()
            .or_else(|| self.description100.first())
            .map(|d| d.description.as_str())
    }
}

/// Response entry of POST /programs
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDetails {
    #[serde(rename = "programID")]
    pub program_id: String,
    #[serde(default)]
    pub titles: Vec<ProgramTitle>,
    #[serde(default)]
    pub episode_title150: Option<String>,
    #[serde(default)]
    pub descriptions: ProgramDescriptions,
    #[serde(default)]
    pub original_air_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
}

impl ProgramDetails {
    pub fn title(&self) -> Option<&str> {
        self.titles.first().map(|t| t.title120.as_str())
    }

    pub fn is_movie(&self) -> bool {
        self.entity_type.as_deref() == Some("Movie") || self.program_id.starts_with("MV")
    }

    pub fn is_series(&self) -> bool {
        self.program_id.starts_with("EP") || self.program_id.starts_with("SH")
    }

    pub fn has_genre(&self, needle: &str) -> bool {
        self.genres
            .iter()
            .any(|g| g.to_lowercase().contains(&needle.to_lowercase()))
    }
}

/// Strip leading zeros from every dotted part: `002` -> `2`, `05.01` -> `5.1`
pub fn normalize_channel_number(number: &str) -> String {
    number
        .trim()
        .split('.')
        .map(|part| {
            let stripped = part.trim_start_matches('0');
            if stripped.is_empty() && !part.is_empty() {
                "0"
            } else {
                stripped
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
