//! Prometheus counters exposed at `/metrics`

use lazy_static::lazy_static;
use prometheus::{register_int_counter, IntCounter};

lazy_static! {
    /// Live streams handed out by the live TV service
    pub static ref STREAMS_OPENED: IntCounter = register_int_counter!(
        "livetv_streams_opened_total",
        "Number of channel streams resolved"
    )
    .unwrap();

    /// Settings refresh cycles that rebuilt the tuner/guide clients
    pub static ref CONFIG_REFRESHES: IntCounter = register_int_counter!(
        "livetv_config_refreshes_total",
        "Number of settings changes applied by the refresh loop"
    )
    .unwrap();

    /// Refresh cycles that failed and were skipped
    pub static ref CONFIG_REFRESH_FAILURES: IntCounter = register_int_counter!(
        "livetv_config_refresh_failures_total",
        "Number of refresh cycles that failed"
    )
    .unwrap();

    pub static ref GUIDE_REAUTHS: IntCounter = register_int_counter!(
        "guide_reauthentications_total",
        "Number of guide token re-authentications after a rejected token"
    )
    .unwrap();

    pub static ref TRAILERS_SKIPPED: IntCounter = register_int_counter!(
        "trailer_entries_skipped_total",
        "Number of malformed catalog entries skipped"
    )
    .unwrap();
}
