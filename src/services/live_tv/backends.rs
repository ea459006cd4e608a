//! Immutable tuner/guide client pair
//!
//! A settings change never mutates a `Backends`; the service builds a new one
//! and swaps the `Arc`, so request handlers holding a snapshot keep a
//! consistent pair for the whole request.

use reqwest::Client;

use crate::services::guide::{GuideClient, GuideCredentials};
use crate::services::settings::LiveTvSettings;
use crate::services::tuner::TunerClient;

pub struct Backends {
    pub settings: LiveTvSettings,
    pub tuner: TunerClient,
    pub guide: GuideClient,
}

/// Builds client pairs from live TV settings
#[derive(Clone)]
pub struct BackendFactory {
    http: Client,
    guide_api_url: String,
}

impl BackendFactory {
    pub fn new(http: Client, guide_api_url: impl Into<String>) -> Self {
        Self {
            http,
            guide_api_url: guide_api_url.into(),
        }
    }

    pub fn build(&self, settings: &LiveTvSettings) -> Backends {
        let tuner = TunerClient::new(
            self.http.clone(),
            &settings.tuner_url,
            settings.load_only_favorites,
        );
        let guide = GuideClient::new(
            self.http.clone(),
            &self.guide_api_url,
            GuideCredentials::new(
                settings.username.trim(),
                settings.hash_password.trim(),
                settings.tv_line_up.trim(),
            ),
        );

        Backends {
            settings: settings.clone(),
            tuner,
            guide,
        }
    }
}
