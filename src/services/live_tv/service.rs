use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock as SyncRwLock};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::backends::{BackendFactory, Backends};
use crate::models::{
    ChannelInfo, LiveTvServiceStatusInfo, LiveTvTunerInfo, LiveTvTunerStatus, MediaProtocol,
    MediaSourceInfo, MediaStream, MediaStreamType, ProgramInfo,
};
use crate::plugin::{LiveTvError, LiveTvService};
use crate::services::guide::{GuideClient, GuideError};
use crate::services::metrics::{CONFIG_REFRESHES, CONFIG_REFRESH_FAILURES, STREAMS_OPENED};
use crate::services::settings::{ConfigStore, DerivedOptions, LiveTvSettings};
use crate::services::tuner::{TunerDevice, TunerStatus};

pub const SERVICE_NAME: &str = "Tuner Live TV";

/// Discovery attempts per settings version before waiting for the next change
const MAX_DISCOVERY_ATTEMPTS: u32 = 5;

/// What a refresh pass did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "camelCase")]
pub enum RefreshOutcome {
    /// Settings version matches the active clients
    Unchanged,
    /// Option lists discovered and stored for the active settings
    Applied,
    /// Lineup/headend discovery failed; retried on later passes
    DiscoveryFailed(String),
}

/// Refresh bookkeeping, guarded by the single-flight lock
#[derive(Debug, Default)]
struct RefreshState {
    /// Settings version the active clients were built from
    version: Option<DateTime<Utc>>,
    /// Option lists not yet written back for `version`
    discovery_pending: bool,
    discovery_failures: u32,
}

/// Live TV service backed by a network tuner and the guide service
pub struct TunerLiveTvService {
    store: Arc<dyn ConfigStore>,
    factory: BackendFactory,
    backends: RwLock<Arc<Backends>>,
    /// Tuner web URL of the active clients, readable without awaiting
    home_page: SyncRwLock<String>,
    refresh_state: Mutex<RefreshState>,
    live_streams: AtomicU64,
}

impl TunerLiveTvService {
    /// Create the service with unconfigured clients; call [`Self::refresh_now`]
    /// or run the refresh task to load settings
    pub fn new(store: Arc<dyn ConfigStore>, factory: BackendFactory) -> Self {
        let backends = Arc::new(factory.build(&LiveTvSettings::default()));
        Self {
            store,
            factory,
            home_page: SyncRwLock::new(backends.tuner.web_url()),
            backends: RwLock::new(backends),
            refresh_state: Mutex::new(RefreshState::default()),
            live_streams: AtomicU64::new(0),
        }
    }

    /// Create the service and apply the current settings once
    pub async fn start(store: Arc<dyn ConfigStore>, factory: BackendFactory) -> Arc<Self> {
        let service = Arc::new(Self::new(store, factory));
        match service.refresh_now().await {
            Ok(outcome) => debug!("Initial live TV refresh: {:?}", outcome),
            Err(e) => warn!("Initial live TV refresh failed: {}", e),
        }
        service
    }

    /// Current client pair
    pub async fn backends(&self) -> Arc<Backends> {
        self.backends.read().await.clone()
    }

    /// Rebuild clients if the settings version moved, or retry pending option
    /// discovery for the active version
    pub async fn refresh_if_changed(&self) -> Result<RefreshOutcome, LiveTvError> {
        self.refresh(false).await
    }

    /// Rebuild clients from the current settings unconditionally
    pub async fn refresh_now(&self) -> Result<RefreshOutcome, LiveTvError> {
        self.refresh(true).await
    }

    async fn refresh(&self, force: bool) -> Result<RefreshOutcome, LiveTvError> {
        let mut state = self.refresh_state.lock().await;

        let current = self.store.last_modified().await?;
        let version_changed = state.version != Some(current);
        if !force && !version_changed && !state.discovery_pending {
            return Ok(RefreshOutcome::Unchanged);
        }

        let (version, backends) = if force || version_changed {
            let snapshot = self.store.load().await?;
            let settings = snapshot.config.live_tv;
            info!(
                "Applying live TV settings (version {}, tuner '{}', lineup '{}')",
                snapshot.version, settings.tuner_url, settings.tv_line_up
            );

            let fresh = Arc::new(self.factory.build(&settings));
            self.swap_backends(fresh.clone()).await;
            CONFIG_REFRESHES.inc();

            *state = RefreshState {
                version: Some(snapshot.version),
                discovery_pending: true,
                discovery_failures: 0,
            };
            (snapshot.version, fresh)
        } else {
            debug!(
                "Retrying guide option discovery (attempt {})",
                state.discovery_failures + 1
            );
            (current, self.backends().await)
        };

        let settings = &backends.settings;
        let derived = match discover_options(&backends.guide, &settings.zip_code).await {
            Ok(derived) => derived,
            Err(e) => {
                CONFIG_REFRESH_FAILURES.inc();
                state.discovery_failures += 1;
                if state.discovery_failures >= MAX_DISCOVERY_ATTEMPTS {
                    state.discovery_pending = false;
                    warn!(
                        "Guide option discovery failed {} times, waiting for a settings change: {}",
                        state.discovery_failures, e
                    );
                } else {
                    warn!("Guide option discovery failed: {}", e);
                }
                return Ok(RefreshOutcome::DiscoveryFailed(e.to_string()));
            }
        };

        if derived.available_lineups == settings.available_lineups
            && derived.headends == settings.headends
        {
            state.discovery_pending = false;
            return Ok(RefreshOutcome::Applied);
        }

        // A failed write leaves discovery pending for the next pass
        let outcome = self.store.save_derived(derived).await?;
        state.discovery_pending = false;
        if outcome.previous == version {
            state.version = Some(outcome.current);
        } else {
            // Settings changed under us; leave the version stale so the next
            // pass picks the change up.
            debug!("Settings modified during refresh, will refresh again");
        }

        Ok(RefreshOutcome::Applied)
    }

    async fn swap_backends(&self, fresh: Arc<Backends>) {
        let url = fresh.tuner.web_url();
        *self.backends.write().await = fresh;
        match self.home_page.write() {
            Ok(mut home_page) => *home_page = url,
            Err(poisoned) => *poisoned.into_inner() = url,
        }
    }

    /// Verify the tuner is configured and answering
    async fn ensure_connection(&self, backends: &Backends) -> Result<TunerDevice, LiveTvError> {
        let device = backends.tuner.get_device_info().await?;
        if !device.is_identified() {
            return Err(LiveTvError::DeviceUnreachable(format!(
                "No tuner found at address {}",
                backends.tuner.web_url()
            )));
        }
        Ok(device)
    }
}

/// Lineup and headend option lists for the settings UI
async fn discover_options(
    guide: &GuideClient,
    postal_code: &str,
) -> Result<DerivedOptions, GuideError> {
    if !guide.credentials().has_account() {
        return Ok(DerivedOptions::default());
    }

    let available_lineups = guide.get_lineup_options().await?;
    let headends = guide.get_headends(postal_code).await?;

    Ok(DerivedOptions {
        available_lineups,
        headends,
    })
}

fn tuner_info(device: &TunerDevice, status: TunerStatus) -> LiveTvTunerInfo {
    let busy = status.is_busy();
    LiveTvTunerInfo {
        id: format!("{}-{}", device.device_id, status.resource),
        name: status.resource,
        source_type: device.model_number.clone(),
        status: if busy {
            LiveTvTunerStatus::LiveTv
        } else {
            LiveTvTunerStatus::Available
        },
        channel_id: status.vct_number.filter(|_| busy),
        channel_name: status.vct_name.filter(|_| busy),
        clients: status.target_ip.filter(|_| busy).into_iter().collect(),
    }
}

#[async_trait]
impl LiveTvService for TunerLiveTvService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    fn home_page_url(&self) -> String {
        match self.home_page.read() {
            Ok(url) => url.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn get_channels(&self) -> Result<Vec<ChannelInfo>, LiveTvError> {
        let backends = self.backends().await;
        if !backends.guide.has_lineup() {
            debug!("No guide lineup selected, no channels to list");
            return Ok(Vec::new());
        }

        info!("Retrieving channels from {}", backends.tuner.web_url());
        self.ensure_connection(&backends).await?;
        backends.guide.ensure_token().await?;

        let channels = backends.tuner.get_channels().await?;
        Ok(backends.guide.get_channel_info(channels).await?)
    }

    async fn get_programs(
        &self,
        channel_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProgramInfo>, LiveTvError> {
        let backends = self.backends().await;
        Ok(backends.guide.get_programs(channel_id, start, end).await?)
    }

    async fn get_channel_stream(
        &self,
        channel_id: &str,
        _stream_id: Option<&str>,
    ) -> Result<MediaSourceInfo, LiveTvError> {
        let backends = self.backends().await;
        let path = backends.tuner.stream_url(channel_id)?;

        let id = self.live_streams.fetch_add(1, Ordering::SeqCst) + 1;
        STREAMS_OPENED.inc();
        info!("Streaming channel {} from {} (stream {})", channel_id, path, id);

        Ok(MediaSourceInfo {
            id: id.to_string(),
            path,
            protocol: MediaProtocol::Http,
            media_streams: vec![
                MediaStream::unknown_index(MediaStreamType::Video),
                MediaStream::unknown_index(MediaStreamType::Audio),
            ],
            is_infinite_stream: true,
        })
    }

    async fn close_live_stream(&self, stream_id: &str) -> Result<(), LiveTvError> {
        info!("Closing stream {}", stream_id);
        Ok(())
    }

    async fn get_status_info(&self) -> Result<LiveTvServiceStatusInfo, LiveTvError> {
        let backends = self.backends().await;
        let device = self.ensure_connection(&backends).await?;
        let tuners = backends.tuner.get_tuners().await?;

        Ok(LiveTvServiceStatusInfo {
            has_update_available: false,
            version: device.firmware_version.clone(),
            tuners: tuners
                .into_iter()
                .map(|status| tuner_info(&device, status))
                .collect(),
        })
    }
}
