//! Guide API Client
//!
//! HTTP client for the EPG service. Every call except token exchange carries
//! the session token in a `token` header; a rejected token triggers exactly
//! one re-authentication and retry.

use super::types::*;
use crate::models::{ChannelInfo, ChannelType, ProgramInfo};
use crate::services::metrics::GUIDE_REAUTHS;
use crate::services::preview;
use crate::services::settings::SelectOption;
use crate::services::tuner::TunerChannel;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Guide service API root
pub const DEFAULT_API_URL: &str = "https://json.schedulesdirect.org/20141201";

/// Upper bound of program ids per POST /programs
const MAX_PROGRAMS_PER_REQUEST: usize = 5000;

/// API codes that mean the account or token was rejected
const AUTH_ERROR_CODES: std::ops::RangeInclusive<i32> = 4001..=4009;

/// API code returned when the account has no lineups yet
const NO_LINEUPS_CODE: i32 = 4102;

#[derive(Debug, Error)]
pub enum GuideError {
    #[error("guide username missing")]
    MissingCredentials,
    #[error("no guide lineup selected")]
    NoLineup,
    #[error("guide service rejected the credentials: {0}")]
    Unauthorized(String),
    #[error("guide service unreachable: {0}")]
    Unreachable(String),
    #[error("guide service error {code}: {message}")]
    Api { code: i32, message: String },
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("guide response parse error: {0}")]
    Parse(String),
}

/// Guide API Client
pub struct GuideClient {
    http: Client,
    api_url: String,
    credentials: GuideCredentials,
    token: RwLock<Option<String>>,
    /// Tuner channel number -> guide station id, filled from the lineup map
    station_ids: RwLock<HashMap<String, String>>,
}

impl GuideClient {
    /// Create a new guide client
    ///
    /// # Arguments
    /// * `http` - Shared HTTP client (carries the request timeout)
    /// * `api_url` - API root, normally [`DEFAULT_API_URL`]
    /// * `credentials` - Account and selected lineup
    pub fn new(http: Client, api_url: &str, credentials: GuideCredentials) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
            token: RwLock::new(None),
            station_ids: RwLock::new(HashMap::new()),
        }
    }

    pub fn credentials(&self) -> &GuideCredentials {
        &self.credentials
    }

    pub fn has_lineup(&self) -> bool {
        self.credentials.has_lineup()
    }

    /// Issue one request and decode the response
    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, GuideError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.api_url, path.trim_start_matches('/'));
        debug!("Guide API request: {} {}", method, path);

        let mut request = self.http.request(method, &url);
        if let Some(token) = token {
            request = request.header("token", token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GuideError::Unreachable("connection timeout".to_string())
            } else {
                GuideError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GuideError::Unreachable(e.to_string()))?;

        let api_status = if text.trim_start().starts_with('{') {
            serde_json::from_str::<ApiStatus>(&text).ok()
        } else {
            None
        };
        let api_code = api_status.as_ref().and_then(|s| s.code).unwrap_or(0);
        let api_message = api_status
            .and_then(|s| s.message)
            .unwrap_or_else(|| status.to_string());

        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || AUTH_ERROR_CODES.contains(&api_code)
        {
            return Err(GuideError::Unauthorized(api_message));
        }

        if !status.is_success() {
            if api_code != 0 {
                return Err(GuideError::Api {
                    code: api_code,
                    message: api_message,
                });
            }
            return Err(GuideError::Http(status.as_u16()));
        }

        serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse guide response for '{}': {}", path, e);
            debug!("Response text: {}", preview(&text, 500));
            GuideError::Parse(e.to_string())
        })
    }

    /// Request with the session token; re-authenticate once on rejection
    async fn call<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, GuideError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = self.ensure_token().await?;

        match self.send(method.clone(), path, body, Some(&token)).await {
            Err(GuideError::Unauthorized(reason)) => {
                warn!("Guide token rejected ({}), re-authenticating", reason);
                GUIDE_REAUTHS.inc();
                self.invalidate_token(&token).await;
                let token = self.ensure_token().await?;
                self.send(method, path, body, Some(&token)).await
            }
            other => other,
        }
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Current session token, exchanging credentials for one when needed
    pub async fn ensure_token(&self) -> Result<String, GuideError> {
        if let Some(token) = self.token.read().await.as_ref() {
            return Ok(token.clone());
        }

        let mut slot = self.token.write().await;
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }

        if !self.credentials.has_account() {
            return Err(GuideError::MissingCredentials);
        }

        let body = TokenRequest {
            username: &self.credentials.username,
            password: &self.credentials.password_hash,
        };
        let response: TokenResponse = self
            .send(Method::POST, "token", Some(&body), None)
            .await?;

        match response.token {
            Some(token) if response.code == 0 && !token.is_empty() => {
                info!("Guide token acquired for {}", self.credentials.username);
                *slot = Some(token.clone());
                Ok(token)
            }
            _ => Err(GuideError::Unauthorized(
                response
                    .message
                    .unwrap_or_else(|| format!("token request failed with code {}", response.code)),
            )),
        }
    }

    /// Forget `rejected` unless another caller already replaced it
    async fn invalidate_token(&self, rejected: &str) {
        let mut slot = self.token.write().await;
        if slot.as_deref() == Some(rejected) {
            *slot = None;
        }
    }

    // ========================================================================
    // Lineups & Headends
    // ========================================================================

    /// Lineups attached to the account
    pub async fn get_lineups(&self) -> Result<Vec<Lineup>, GuideError> {
        match self
            .call::<LineupsResponse, ()>(Method::GET, "lineups", None)
            .await
        {
            Ok(response) => Ok(response
                .lineups
                .into_iter()
                .filter(|l| l.is_deleted != Some(true))
                .collect()),
            Err(GuideError::Api { code, .. }) if code == NO_LINEUPS_CODE => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Account lineups as name/value options
    pub async fn get_lineup_options(&self) -> Result<Vec<SelectOption>, GuideError> {
        Ok(self
            .get_lineups()
            .await?
            .into_iter()
            .map(|l| {
                let name = if l.name.is_empty() { l.lineup.clone() } else { l.name };
                SelectOption::new(name, l.lineup)
            })
            .collect())
    }

    /// Lineups offered for a postal code, as name -> lineup id
    pub async fn get_headends(&self, postal_code: &str) -> Result<Vec<SelectOption>, GuideError> {
        let postal_code = postal_code.trim();
        if postal_code.is_empty() {
            return Ok(Vec::new());
        }

        let path = format!(
            "headends?country=USA&postalcode={}",
            url::form_urlencoded::byte_serialize(postal_code.as_bytes()).collect::<String>()
        );
        let headends: Vec<Headend> = self.call::<_, ()>(Method::GET, &path, None).await?;

        Ok(headend_options(&headends))
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// Fetch the selected lineup's channel -> station map and remember it
    async fn fetch_lineup_map(&self) -> Result<LineupMap, GuideError> {
        if !self.credentials.has_lineup() {
            return Err(GuideError::NoLineup);
        }

        let path = format!("lineups/{}", self.credentials.lineup);
        let map: LineupMap = self.call::<_, ()>(Method::GET, &path, None).await?;

        let mut ids = HashMap::new();
        for mapping in &map.map {
            if let Some(number) = mapping.channel_number() {
                ids.insert(number, mapping.station_id.clone());
            }
        }
        *self.station_ids.write().await = ids;

        Ok(map)
    }

    /// Merge tuner channels with guide station metadata
    pub async fn get_channel_info(
        &self,
        channels: Vec<TunerChannel>,
    ) -> Result<Vec<ChannelInfo>, GuideError> {
        let map = self.fetch_lineup_map().await?;
        Ok(merge_channels(channels, &map))
    }

    // ========================================================================
    // Programs
    // ========================================================================

    async fn station_id_for(&self, channel_id: &str) -> Result<Option<String>, GuideError> {
        let number = normalize_channel_number(channel_id);
        if let Some(id) = self.station_ids.read().await.get(&number) {
            return Ok(Some(id.clone()));
        }

        self.fetch_lineup_map().await?;
        Ok(self.station_ids.read().await.get(&number).cloned())
    }

    /// Programs airing on a tuner channel within `[start, end)`
    pub async fn get_programs(
        &self,
        channel_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProgramInfo>, GuideError> {
        if end <= start {
            return Ok(Vec::new());
        }

        let Some(station_id) = self.station_id_for(channel_id).await? else {
            warn!("No guide station for channel {}", channel_id);
            return Ok(Vec::new());
        };

        let request = vec![ScheduleRequest {
            station_id: station_id.clone(),
            date: schedule_dates(start, end),
        }];
        let schedules: Vec<StationSchedule> =
            self.call(Method::POST, "schedules", Some(&request)).await?;

        let airings = airings_in_window(&schedules, &station_id, start, end);
        if airings.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let program_ids: Vec<String> = airings
            .iter()
            .filter(|a| seen.insert(a.program_id.clone()))
            .map(|a| a.program_id.clone())
            .collect();

        let mut details = HashMap::new();
        for chunk in program_ids.chunks(MAX_PROGRAMS_PER_REQUEST) {
            let batch: Vec<ProgramDetails> =
                self.call(Method::POST, "programs", Some(chunk)).await?;
            for program in batch {
                details.insert(program.program_id.clone(), program);
            }
        }

        let mut programs: Vec<ProgramInfo> = airings
            .iter()
            .filter_map(|airing| {
                let end_date = airing.end_time()?;
                details
                    .get(&airing.program_id)
                    .map(|d| program_info(channel_id, airing, end_date, d))
            })
            .collect();
        programs.sort_by_key(|p| p.start_date);

        Ok(programs)
    }
}

/// One option per lineup of every headend, in response order
pub fn headend_options(headends: &[Headend]) -> Vec<SelectOption> {
    headends
        .iter()
        .flat_map(|h| {
            h.lineups.iter().map(move |l| {
                SelectOption::new(
                    format!("{} ({} {})", l.name, h.headend, h.transport),
                    l.lineup.clone(),
                )
            })
        })
        .collect()
}

/// Tuner channels enriched with their guide station, tuner order preserved
pub fn merge_channels(channels: Vec<TunerChannel>, map: &LineupMap) -> Vec<ChannelInfo> {
    let stations: HashMap<&str, &Station> = map
        .stations
        .iter()
        .map(|s| (s.station_id.as_str(), s))
        .collect();

    let by_number: HashMap<String, &Station> = map
        .map
        .iter()
        .filter_map(|m| {
            let number = m.channel_number()?;
            let station = stations.get(m.station_id.as_str())?;
            Some((number, *station))
        })
        .collect();

    channels
        .into_iter()
        .map(|channel| {
            let station = by_number
                .get(&normalize_channel_number(&channel.guide_number))
                .copied();
            let image_url = station.and_then(|s| s.logo_url()).map(str::to_string);
            let name = if channel.guide_name.is_empty() {
                station
                    .map(|s| s.callsign.clone())
                    .unwrap_or_else(|| channel.guide_number.clone())
            } else {
                channel.guide_name.clone()
            };

            ChannelInfo {
                id: channel.guide_number.clone(),
                number: channel.guide_number.clone(),
                name,
                channel_type: ChannelType::Tv,
                has_image: image_url.is_some(),
                image_url,
                guide_id: station.map(|s| s.station_id.clone()),
                call_sign: station
                    .map(|s| s.callsign.clone())
                    .filter(|c| !c.is_empty()),
                is_hd: channel.is_hd(),
            }
        })
        .collect()
}

/// Every UTC date touched by `[start, end)`
pub fn schedule_dates(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<String> {
    let first: NaiveDate = start.date_naive();
    let last: NaiveDate = (end - Duration::nanoseconds(1)).date_naive();

    first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect()
}

/// Airings of `station_id` overlapping `[start, end)`
pub fn airings_in_window(
    schedules: &[StationSchedule],
    station_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<Airing> {
    schedules
        .iter()
        .filter(|s| s.station_id == station_id)
        .flat_map(|s| s.programs.iter())
        .filter(|a| match a.end_time() {
            Some(airing_end) => a.air_date_time < end && airing_end > start,
            None => {
                warn!(
                    "Skipping airing {} with out-of-range duration {}",
                    a.program_id, a.duration
                );
                false
            }
        })
        .cloned()
        .collect()
}

fn program_info(
    channel_id: &str,
    airing: &Airing,
    end_date: DateTime<Utc>,
    details: &ProgramDetails,
) -> ProgramInfo {
    ProgramInfo {
        id: format!("{}_{}", airing.program_id, airing.air_date_time.timestamp()),
        channel_id: channel_id.to_string(),
        name: details.title().unwrap_or_default().to_string(),
        start_date: airing.air_date_time,
        end_date,
        overview: details.descriptions.best().map(str::to_string),
        episode_title: details.episode_title150.clone(),
        genres: details.genres.clone(),
        original_air_date: details
            .original_air_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc()),
        is_movie: details.is_movie(),
        is_series: details.is_series(),
        is_sports: details.has_genre("sports"),
        is_news: details.has_genre("news"),
        is_kids: details.has_genre("children"),
        is_repeat: airing.new != Some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode as AxumStatus},
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counters {
        tokens: AtomicUsize,
    }

    /// Issues token `t1`, `t2`, ... on each POST /token
    async fn issue_token(State(counters): State<Arc<Counters>>) -> impl IntoResponse {
        let n = counters.tokens.fetch_add(1, Ordering::SeqCst) + 1;
        Json(serde_json::json!({"code": 0, "message": "OK", "token": format!("t{}", n)}))
    }

    fn lineups_body() -> serde_json::Value {
        serde_json::json!({"lineups": [{"lineup": "USA-NY-X", "name": "Cable NY"}]})
    }

    fn credentials() -> GuideCredentials {
        GuideCredentials::new("alice", "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8", "USA-NY-X")
    }

    #[tokio::test]
    async fn test_reauthenticates_once_after_rejected_token() {
        let counters = Arc::new(Counters::default());
        let app = Router::new()
            .route("/token", post(issue_token))
            .route(
                "/lineups",
                get(|headers: HeaderMap| async move {
                    // Only the second token is accepted
                    if headers.get("token").and_then(|v| v.to_str().ok()) == Some("t2") {
                        Json(lineups_body()).into_response()
                    } else {
                        (
                            AxumStatus::FORBIDDEN,
                            Json(serde_json::json!({"code": 4006, "message": "Token expired"})),
                        )
                            .into_response()
                    }
                }),
            )
            .with_state(counters.clone());
        let base = test_support::serve(app).await;
        let client = GuideClient::new(test_support::client(), &base, credentials());

        let lineups = client.get_lineups().await.unwrap();
        assert_eq!(lineups.len(), 1);
        assert_eq!(lineups[0].lineup, "USA-NY-X");
        assert_eq!(counters.tokens.load(Ordering::SeqCst), 2);

        // The fresh token is reused
        client.get_lineups().await.unwrap();
        assert_eq!(counters.tokens.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_rejection_surfaces_error() {
        let counters = Arc::new(Counters::default());
        let app = Router::new()
            .route("/token", post(issue_token))
            .route(
                "/lineups",
                get(|| async {
                    (
                        AxumStatus::UNAUTHORIZED,
                        Json(serde_json::json!({"code": 4006, "message": "Token expired"})),
                    )
                }),
            )
            .with_state(counters.clone());
        let base = test_support::serve(app).await;
        let client = GuideClient::new(test_support::client(), &base, credentials());

        let result = client.get_lineups().await;
        assert!(matches!(result, Err(GuideError::Unauthorized(_))));
        assert_eq!(counters.tokens.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_token_rejected_at_login() {
        let app = Router::new().route(
            "/token",
            post(|| async {
                (
                    AxumStatus::BAD_REQUEST,
                    Json(serde_json::json!({"code": 4003, "message": "Invalid user"})),
                )
            }),
        );
        let base = test_support::serve(app).await;
        let client = GuideClient::new(test_support::client(), &base, credentials());

        assert!(matches!(
            client.ensure_token().await,
            Err(GuideError::Unauthorized(msg)) if msg == "Invalid user"
        ));
    }

    #[tokio::test]
    async fn test_missing_username() {
        let client = GuideClient::new(
            test_support::client(),
            "http://127.0.0.1:9",
            GuideCredentials::default(),
        );
        assert!(matches!(
            client.ensure_token().await,
            Err(GuideError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_empty_postal_code_skips_request() {
        // Unreachable API: any request would fail
        let client = GuideClient::new(test_support::client(), "http://127.0.0.1:9", credentials());
        assert!(client.get_headends("  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_programs_for_channel() {
        let counters = Arc::new(Counters::default());
        let app = Router::new()
            .route("/token", post(issue_token))
            .route(
                "/lineups/USA-NY-X",
                get(|| async {
                    Json(serde_json::json!({
                        "map": [{"stationID": "20454", "channel": "002"}],
                        "stations": [{"stationID": "20454", "name": "WCBS", "callsign": "WCBS"}]
                    }))
                }),
            )
            .route(
                "/schedules",
                post(|| async {
                    Json(serde_json::json!([{
                        "stationID": "20454",
                        "programs": [
                            {"programID": "EP1", "airDateTime": "2024-05-01T13:00:00Z", "duration": 3600, "new": true},
                            {"programID": "EP0", "airDateTime": "2024-05-01T12:00:00Z", "duration": 3600},
                            {"programID": "MV9", "airDateTime": "2024-05-01T20:00:00Z", "duration": 7200},
                            {"programID": "EP2", "airDateTime": "2024-05-01T14:00:00Z", "duration": 9223372036854775807i64}
                        ]
                    }]))
                }),
            )
            .route(
                "/programs",
                post(|| async {
                    Json(serde_json::json!([
                        {"programID": "EP0", "titles": [{"title120": "Morning News"}], "genres": ["News"]},
                        {"programID": "EP1", "titles": [{"title120": "Show"}], "episodeTitle150": "Pilot"}
                    ]))
                }),
            )
            .with_state(counters);
        let base = test_support::serve(app).await;
        let client = GuideClient::new(test_support::client(), &base, credentials());

        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
        let programs = client.get_programs("2", start, end).await.unwrap();

        assert_eq!(programs.len(), 2);
        assert_eq!(programs[0].name, "Morning News");
        assert!(programs[0].is_news);
        assert!(programs[0].is_repeat);
        assert_eq!(programs[1].episode_title.as_deref(), Some("Pilot"));
        assert!(!programs[1].is_repeat);
        assert_eq!(programs[1].channel_id, "2");
        assert_eq!(
            programs[1].end_date,
            Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_airings_with_out_of_range_duration_skipped() {
        let schedules: Vec<StationSchedule> = serde_json::from_str(
            r#"[{"stationID":"20454","programs":[{"programID":"EP1","airDateTime":"2024-05-01T12:00:00Z","duration":1800},{"programID":"EP2","airDateTime":"2024-05-01T12:30:00Z","duration":9223372036854775807},{"programID":"EP3","airDateTime":"2024-05-01T13:00:00Z","duration":-9223372036854775808}]}]"#,
        )
        .unwrap();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();

        let airings = airings_in_window(&schedules, "20454", start, end);
        assert_eq!(airings.len(), 1);
        assert_eq!(airings[0].program_id, "EP1");
        assert_eq!(
            airings[0].end_time(),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_schedule_dates_span_window() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 22, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap();
        assert_eq!(schedule_dates(start, end), vec!["2024-05-01", "2024-05-02"]);
    }

    #[test]
    fn test_headend_options() {
        let json = r#"[{"headend":"NY31519","transport":"Cable","location":"New York","lineups":[{"name":"Cable Digital","lineup":"USA-NY31519-X"},{"name":"Cable Basic","lineup":"USA-NY31519-DEFAULT"}]},{"headend":"10001","transport":"Antenna","location":"10001","lineups":[{"name":"Antenna","lineup":"USA-OTA-10001"}]}]"#;
        let headends: Vec<Headend> = serde_json::from_str(json).unwrap();

        let options = headend_options(&headends);
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].name, "Cable Digital (NY31519 Cable)");
        assert_eq!(options[0].value, "USA-NY31519-X");
        assert_eq!(options[2].value, "USA-OTA-10001");
    }

    #[test]
    fn test_merge_channels_keeps_unmapped() {
        let map: LineupMap = serde_json::from_str(
            r#"{"map":[{"stationID":"20454","channel":"002"}],"stations":[{"stationID":"20454","name":"WCBS","callsign":"WCBS","logo":{"URL":"http://logos/wcbs.png"}}]}"#,
        )
        .unwrap();
        let channels: Vec<TunerChannel> = serde_json::from_str(
            r#"[{"GuideNumber":"2","GuideName":"WCBS-HD","HD":1},{"GuideNumber":"99","GuideName":""}]"#,
        )
        .unwrap();

        let merged = merge_channels(channels, &map);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].guide_id.as_deref(), Some("20454"));
        assert_eq!(merged[0].image_url.as_deref(), Some("http://logos/wcbs.png"));
        assert!(merged[0].has_image);
        assert!(merged[0].is_hd);
        assert_eq!(merged[1].name, "99");
        assert!(merged[1].guide_id.is_none());
    }
}
