//! Electronic Program Guide Integration
//!
//! Client for a token-authenticated JSON guide service:
//!
//! - **Token**: credentials (username + SHA1 password hash) -> session token
//! - **Lineups**: lineups on the account, and lineups offered per postal code
//! - **Channels**: lineup map (channel number -> station) used to enrich tuner channels
//! - **Programs**: schedules per station and date, then program metadata
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::services::guide::{GuideClient, GuideCredentials, DEFAULT_API_URL};
//!
//! let guide = GuideClient::new(http, DEFAULT_API_URL, GuideCredentials::new(user, hash, lineup));
//! let lineups = guide.get_lineups().await?;
//! let programs = guide.get_programs("2", start, end).await?;
//! ```

pub mod client;
pub mod types;

pub use client::{GuideClient, GuideError, DEFAULT_API_URL};
pub use types::{GuideCredentials, Lineup};
