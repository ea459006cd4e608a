//! Live TV backend
//!
//! Combines the tuner client (channels, streams, tuner status) with the guide
//! client (channel metadata, programs) behind [`crate::plugin::LiveTvService`].

mod backends;
mod service;

pub use backends::{BackendFactory, Backends};
pub use service::{RefreshOutcome, TunerLiveTvService, SERVICE_NAME};
