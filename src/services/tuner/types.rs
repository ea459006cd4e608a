//! Tuner API Types
//!
//! Type definitions for the network tuner's JSON endpoints.

use serde::{Deserialize, Serialize};

/// Device information (from discover.json)
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct TunerDevice {
    #[serde(default)]
    pub model_number: String,
    #[serde(default)]
    pub firmware_version: String,
    #[serde(default, rename = "DeviceID")]
    pub device_id: String,
}

impl TunerDevice {
    /// A device that answered but did not identify itself
    pub fn is_identified(&self) -> bool {
        !self.model_number.trim().is_empty()
    }
}

/// Channel lineup entry (from lineup.json)
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct TunerChannel {
    pub guide_number: String,
    #[serde(default)]
    pub guide_name: String,
    #[serde(default)]
    pub favorite: Option<u8>,
    #[serde(default, rename = "HD")]
    pub hd: Option<u8>,
}

impl TunerChannel {
    pub fn is_favorite(&self) -> bool {
        self.favorite == Some(1)
    }

    pub fn is_hd(&self) -> bool {
        self.hd == Some(1)
    }
}

/// Physical tuner status (from status.json)
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct TunerStatus {
    pub resource: String,
    #[serde(default)]
    pub vct_number: Option<String>,
    #[serde(default)]
    pub vct_name: Option<String>,
    #[serde(default, rename = "TargetIP")]
    pub target_ip: Option<String>,
}

impl TunerStatus {
    /// Idle tuners only report their resource name
    pub fn is_busy(&self) -> bool {
        self.vct_number.as_deref().is_some_and(|n| !n.is_empty())
    }
}
