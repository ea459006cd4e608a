//! Settings refresh loop for the live TV service
//!
//! Polls the settings version on a fixed interval and rebuilds the tuner and
//! guide clients when it moves. Ticks never overlap: a slow refresh delays
//! the next tick instead of queueing extra ones.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::services::live_tv::{RefreshOutcome, TunerLiveTvService};
use crate::services::metrics::CONFIG_REFRESH_FAILURES;

/// Configuration for the refresh loop
pub struct RefreshConfig {
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// Run a single refresh cycle; failures are logged and swallowed
pub async fn run_refresh(service: &TunerLiveTvService) -> Option<RefreshOutcome> {
    match service.refresh_if_changed().await {
        Ok(RefreshOutcome::Unchanged) => Some(RefreshOutcome::Unchanged),
        Ok(outcome) => {
            tracing::info!("Live TV settings refreshed: {:?}", outcome);
            Some(outcome)
        }
        Err(e) => {
            CONFIG_REFRESH_FAILURES.inc();
            tracing::warn!("Live TV settings refresh failed: {}", e);
            None
        }
    }
}

/// Start the background refresh task
///
/// Runs until `shutdown` is cancelled. Spawn with `tokio::spawn`.
pub async fn start_refresh_task(
    service: Arc<TunerLiveTvService>,
    config: RefreshConfig,
    shutdown: CancellationToken,
) {
    tracing::info!(
        "Starting live TV refresh task (interval: {}ms)",
        config.interval.as_millis()
    );

    let mut interval = time::interval(config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Live TV refresh task stopped");
                break;
            }
            _ = interval.tick() => {
                run_refresh(&service).await;
            }
        }
    }
}
