//! Host plugin contracts
//!
//! The media-server host drives plugins through these two traits. Operations
//! a plugin does not offer return a typed "not supported" error instead of
//! panicking, so the host can hide the feature.

mod channel;
mod live_tv;

pub use channel::{Channel, ChannelError};
pub use live_tv::{LiveTvError, LiveTvService};
