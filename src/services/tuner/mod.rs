//! Network Tuner Integration
//!
//! Client for tuners that expose a JSON API on the local network:
//!
//! - `discover.json` - model, firmware, tuner count
//! - `lineup.json` - channel lineup with favorite/HD/DRM flags
//! - `status.json` - busy/idle status of each physical tuner
//!
//! Streams are served as raw MPEG-TS at a predictable URL:
//! ```text
//! http://device:5004/auto/v{channel}
//! ```

pub mod client;
pub mod types;

pub use client::{TunerAddress, TunerClient, TunerError};
pub use types::{TunerChannel, TunerDevice, TunerStatus};
