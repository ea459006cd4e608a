//! Plugin settings store
//!
//! Persisted settings for both plugins, versioned by a last-modified timestamp.
//! The live TV refresh loop polls [`ConfigStore::last_modified`] and writes the
//! lineup/headend option lists it discovers back with
//! [`ConfigStore::save_derived`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};

/// A name/value pair offered to the user in the settings UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Live TV plugin settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveTvSettings {
    /// Tuner address, e.g. `http://192.168.1.20`
    pub tuner_url: String,
    pub load_only_favorites: bool,
    /// Guide service account
    pub username: String,
    /// SHA1 hex of the guide service password
    pub hash_password: String,
    /// Selected guide lineup id (empty when none picked yet)
    pub tv_line_up: String,
    pub zip_code: String,

    // Derived by the refresh loop
    pub available_lineups: Vec<SelectOption>,
    pub headends: Vec<SelectOption>,
}

/// Trailer channel settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrailerSettings {
    /// Only list trailers posted within this many days (all when unset)
    pub max_trailer_age_days: Option<u32>,
}

/// Complete persisted plugin configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginConfig {
    pub live_tv: LiveTvSettings,
    pub trailers: TrailerSettings,
}

/// Option lists computed from the guide service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedOptions {
    pub available_lineups: Vec<SelectOption>,
    pub headends: Vec<SelectOption>,
}

/// Configuration together with the version it was read at
#[derive(Debug, Clone)]
pub struct SettingsSnapshot {
    pub config: PluginConfig,
    pub version: DateTime<Utc>,
}

/// Versions observed around a derived-options write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Version immediately before the write
    pub previous: DateTime<Utc>,
    /// Version after the write
    pub current: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Host configuration surface consumed by the plugins
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Current configuration version
    async fn last_modified(&self) -> Result<DateTime<Utc>, SettingsError>;

    async fn load(&self) -> Result<SettingsSnapshot, SettingsError>;

    /// Replace the whole configuration (settings UI writes)
    async fn save(&self, config: PluginConfig) -> Result<DateTime<Utc>, SettingsError>;

    /// Write only the derived live TV option lists, keeping every other field
    async fn save_derived(&self, derived: DerivedOptions) -> Result<SaveOutcome, SettingsError>;
}

/// Next version strictly after `previous`
fn next_version(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

fn apply_derived(config: &mut PluginConfig, derived: DerivedOptions) {
    config.live_tv.available_lineups = derived.available_lineups;
    config.live_tv.headends = derived.headends;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Settings held in memory only
pub struct MemoryConfigStore {
    inner: RwLock<SettingsSnapshot>,
}

impl MemoryConfigStore {
    pub fn new(config: PluginConfig) -> Self {
        Self {
            inner: RwLock::new(SettingsSnapshot {
                config,
                version: Utc::now(),
            }),
        }
    }

    /// Mutate the configuration in place and bump its version
    pub async fn update<F>(&self, f: F) -> DateTime<Utc>
    where
        F: FnOnce(&mut PluginConfig),
    {
        let mut guard = self.inner.write().await;
        f(&mut guard.config);
        guard.version = next_version(guard.version);
        guard.version
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn last_modified(&self) -> Result<DateTime<Utc>, SettingsError> {
        Ok(self.inner.read().await.version)
    }

    async fn load(&self) -> Result<SettingsSnapshot, SettingsError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, config: PluginConfig) -> Result<DateTime<Utc>, SettingsError> {
        Ok(self.update(|c| *c = config).await)
    }

    async fn save_derived(&self, derived: DerivedOptions) -> Result<SaveOutcome, SettingsError> {
        let mut guard = self.inner.write().await;
        let previous = guard.version;
        apply_derived(&mut guard.config, derived);
        guard.version = next_version(previous);
        Ok(SaveOutcome {
            previous,
            current: guard.version,
        })
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// On-disk layout: the configuration plus the version it was written at
#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<DateTime<Utc>>,
    #[serde(flatten)]
    config: PluginConfig,
}

/// Settings persisted as a JSON file
///
/// Every write stamps a `version` strictly greater than the previous one, so
/// two writes landing within the same filesystem timestamp tick still get
/// distinct versions. Files without a stamp (hand-written ones) fall back to
/// their mtime.
pub struct FileConfigStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_snapshot(&self) -> Result<SettingsSnapshot, SettingsError> {
        let file = match fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(|b| b.is_ascii_whitespace()) => SettingsFile::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SettingsSnapshot {
                    config: PluginConfig::default(),
                    version: DateTime::<Utc>::from(std::time::UNIX_EPOCH),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let version = match file.version {
            Some(version) => version,
            None => DateTime::<Utc>::from(fs::metadata(&self.path).await?.modified()?),
        };
        Ok(SettingsSnapshot {
            config: file.config,
            version,
        })
    }

    /// Write via temp file + rename so readers never see a partial file
    async fn write_config(
        &self,
        config: PluginConfig,
        version: DateTime<Utc>,
    ) -> Result<(), SettingsError> {
        let file = SettingsFile {
            version: Some(version),
            config,
        };
        let json = serde_json::to_vec_pretty(&file)?;
        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, &json).await?;
        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn last_modified(&self) -> Result<DateTime<Utc>, SettingsError> {
        Ok(self.read_snapshot().await?.version)
    }

    async fn load(&self) -> Result<SettingsSnapshot, SettingsError> {
        self.read_snapshot().await
    }

    async fn save(&self, config: PluginConfig) -> Result<DateTime<Utc>, SettingsError> {
        let _guard = self.write_lock.lock().await;
        let version = next_version(self.read_snapshot().await?.version);
        self.write_config(config, version).await?;
        Ok(version)
    }

    async fn save_derived(&self, derived: DerivedOptions) -> Result<SaveOutcome, SettingsError> {
        let _guard = self.write_lock.lock().await;
        let SettingsSnapshot {
            mut config,
            version: previous,
        } = self.read_snapshot().await?;
        apply_derived(&mut config, derived);
        let current = next_version(previous);
        self.write_config(config, current).await?;
        Ok(SaveOutcome { previous, current })
    }
}
