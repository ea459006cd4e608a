//! Trailer channel
//!
//! Downloads the public movie trailer catalog and exposes it as a content
//! channel through [`crate::plugin::Channel`].

pub mod channel;
pub mod downloader;
pub mod types;

pub use channel::TrailerChannel;
pub use downloader::{TrailerError, TrailerListingDownloader, DEFAULT_CATALOG_URL};
pub use types::TrailerRecord;
