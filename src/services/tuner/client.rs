//! Tuner HTTP Client
//!
//! Talks to a network tuner's JSON endpoints and builds direct stream URLs.

use super::types::*;
use crate::services::preview;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

/// Port the tuner serves MPEG-TS streams on when the address names none
const DEFAULT_STREAM_PORT: u16 = 5004;

/// Resolved tuner endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunerAddress {
    /// JSON API and web UI base, e.g. `http://10.0.0.5`
    pub web: String,
    /// Stream base, e.g. `http://10.0.0.5:5004`
    pub stream: String,
}

impl TunerAddress {
    /// Parse a configured address. A missing scheme means `http://`.
    ///
    /// An explicit port is used for both the API and the streams; without
    /// one, streams go to the tuner's default stream port.
    pub fn parse(address: &str) -> Option<Self> {
        let trimmed = address.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };

        let parsed = match Url::parse(&with_scheme) {
            Ok(url) => url,
            Err(e) => {
                debug!("Failed to parse tuner address {}: {}", address, e);
                return None;
            }
        };

        let host = parsed.host_str()?;
        let scheme = parsed.scheme();

        match parsed.port() {
            Some(port) => {
                let base = format!("{}://{}:{}", scheme, host, port);
                Some(Self {
                    web: base.clone(),
                    stream: base,
                })
            }
            None => Some(Self {
                web: format!("{}://{}", scheme, host),
                stream: format!("{}://{}:{}", scheme, host, DEFAULT_STREAM_PORT),
            }),
        }
    }
}

/// Tuner API Client
///
/// No retries and no caching: every call re-issues its request.
pub struct TunerClient {
    http: Client,
    raw_address: String,
    address: Option<TunerAddress>,
    favorites_only: bool,
}

impl TunerClient {
    /// Create a new tuner client
    ///
    /// # Arguments
    /// * `http` - Shared HTTP client (carries the request timeout)
    /// * `address` - Configured tuner address, may be empty
    /// * `favorites_only` - Only list channels flagged as favorites
    pub fn new(http: Client, address: &str, favorites_only: bool) -> Self {
        let parsed = TunerAddress::parse(address);
        if parsed.is_none() && !address.trim().is_empty() {
            warn!("Ignoring invalid tuner address: {}", address);
        }

        Self {
            http,
            raw_address: address.trim().to_string(),
            address: parsed,
            favorites_only,
        }
    }

    fn address(&self) -> Result<&TunerAddress, TunerError> {
        match &self.address {
            Some(address) => Ok(address),
            None if self.raw_address.is_empty() => Err(TunerError::MissingAddress),
            None => Err(TunerError::InvalidAddress(self.raw_address.clone())),
        }
    }

    pub fn has_address(&self) -> bool {
        self.address.is_some()
    }

    /// Web UI URL of the device (empty when no address is configured)
    pub fn web_url(&self) -> String {
        self.address
            .as_ref()
            .map(|a| a.web.clone())
            .unwrap_or_default()
    }

    /// Make a GET request against the device's JSON API
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TunerError> {
        let url = format!("{}/{}", self.address()?.web, path);

        debug!("Tuner API request: {}", url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                TunerError::Unreachable("connection timeout - device did not respond".to_string())
            } else if e.is_connect() {
                TunerError::Unreachable("connection failed - device unreachable".to_string())
            } else {
                TunerError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TunerError::Http(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| TunerError::Unreachable(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse tuner response for '{}': {}", path, e);
            debug!("Response text: {}", preview(&text, 500));
            TunerError::Parse(e.to_string())
        })
    }

    /// Get device model and firmware
    pub async fn get_device_info(&self) -> Result<TunerDevice, TunerError> {
        self.get("discover.json").await
    }

    /// Get the channel lineup, filtered to favorites when configured
    pub async fn get_channels(&self) -> Result<Vec<TunerChannel>, TunerError> {
        let channels: Vec<TunerChannel> = self.get("lineup.json").await?;
        Ok(filter_favorites(channels, self.favorites_only))
    }

    /// Get busy/idle status of every physical tuner
    pub async fn get_tuners(&self) -> Result<Vec<TunerStatus>, TunerError> {
        self.get("status.json").await
    }

    /// Direct MPEG-TS stream URL for a channel
    pub fn stream_url(&self, channel_id: &str) -> Result<String, TunerError> {
        Ok(format!("{}/auto/v{}", self.address()?.stream, channel_id))
    }
}

/// Keep only favorite channels when `favorites_only` is set
pub fn filter_favorites(channels: Vec<TunerChannel>, favorites_only: bool) -> Vec<TunerChannel> {
    if !favorites_only {
        return channels;
    }
    channels.into_iter().filter(|c| c.is_favorite()).collect()
}

/// Tuner API Error types
#[derive(Debug)]
pub enum TunerError {
    /// No tuner address configured
    MissingAddress,
    /// Configured address could not be parsed
    InvalidAddress(String),
    /// Network/connection error
    Unreachable(String),
    /// HTTP error (non-2xx status)
    Http(u16),
    /// JSON parsing error
    Parse(String),
}

impl std::fmt::Display for TunerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TunerError::MissingAddress => write!(f, "Tuner hostname/ip missing"),
            TunerError::InvalidAddress(a) => write!(f, "Invalid tuner address: {}", a),
            TunerError::Unreachable(e) => write!(f, "Tuner unreachable: {}", e),
            TunerError::Http(code) => write!(f, "HTTP error: {}", code),
            TunerError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for TunerError {}
