//! Configuration for the harvest sheets module
//!
//! Layering: built-in defaults, then an optional YAML file, then
//! `HARVEST_`-prefixed environment variables (`__` separates nested keys,
//! e.g. `HARVEST_TIMEOUTS__READ=5s`).

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::photos::DEFAULT_PHOTOS_KEY;
use crate::domain::settings::DEFAULT_SETTINGS_KEY;

/// Module configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding the persisted settings and photo records
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Storage key of the settings record
    #[serde(default = "default_settings_key")]
    pub settings_key: String,

    /// Storage key of the harvest photo map
    #[serde(default = "default_photos_key")]
    pub photos_key: String,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Round-trip limits per operation class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Simple reads
    #[serde(with = "humantime_serde")]
    pub read: Duration,
    /// Reads spanning several sheets
    #[serde(with = "humantime_serde")]
    pub combined: Duration,
    /// Single-row writes
    #[serde(with = "humantime_serde")]
    pub write: Duration,
    /// Multi-row writes
    #[serde(with = "humantime_serde")]
    pub bulk: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(12),
            combined: Duration::from_secs(15),
            write: Duration::from_secs(20),
            bulk: Duration::from_secs(30),
        }
    }
}

/// Read cache lifetimes; a zero TTL keeps entries forever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(with = "humantime_serde")]
    pub tabs_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub items_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub harvest_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub packing_ttl: Duration,
    /// Drop affected cache entries after a confirmed write
    pub invalidate_on_write: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            tabs_ttl: Duration::from_secs(60),
            items_ttl: Duration::from_secs(10),
            harvest_ttl: Duration::from_secs(8),
            packing_ttl: Duration::from_secs(30),
            invalidate_on_write: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            settings_key: default_settings_key(),
            photos_key: default_photos_key(),
            timeouts: TimeoutConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, `path` (if any) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed("HARVEST_").split("__"))
            .extract()
            .context("invalid harvest sheets configuration")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("harvest-sheets"))
        .unwrap_or_else(|| PathBuf::from(".harvest-sheets"))
}

fn default_settings_key() -> String {
    DEFAULT_SETTINGS_KEY.to_string()
}

fn default_photos_key() -> String {
    DEFAULT_PHOTOS_KEY.to_string()
}
