use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CardioError, CardioResult};

pub const DEFAULT_STATS_KEY: &str = "@TZpersisted:appleWatchStats";
pub const DEFAULT_PERSIST_INTERVAL_MS: u64 = 5000;

fn default_stats_key() -> String {
    DEFAULT_STATS_KEY.to_string()
}

fn default_persist_interval_ms() -> u64 {
    DEFAULT_PERSIST_INTERVAL_MS
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".cardiowatch")
}

fn default_timeout_secs() -> u64 {
    10
}

/// Konfig for klokke-cachen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_stats_key", alias = "storage_key")]
    pub stats_key: String,
    #[serde(default = "default_persist_interval_ms")]
    pub persist_interval_ms: u64,
    /// Katalog for `FileStore`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stats_key: default_stats_key(),
            persist_interval_ms: default_persist_interval_ms(),
            data_dir: default_data_dir(),
        }
    }
}

impl CacheConfig {
    pub fn persist_interval(&self) -> Duration {
        Duration::from_millis(self.persist_interval_ms)
    }

    pub fn validate(&self) -> CardioResult<()> {
        if self.stats_key.trim().is_empty() {
            return Err(CardioError::Config("stats_key kan ikke være tom".into()));
        }
        if self.persist_interval_ms == 0 {
            return Err(CardioError::Config("persist_interval_ms må være > 0".into()));
        }
        Ok(())
    }
}

/// Konfig for cardio-tjenesten (HTTP).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Brukerens enheter for distanse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default)]
    pub service: Option<ServiceConfig>,
}

impl Config {
    /// Parse fra JSON med feltsti i feilmeldingen.
    pub fn from_json(s: &str) -> CardioResult<Self> {
        let de = &mut serde_json::Deserializer::from_str(s);
        let cfg: Config = serde_path_to_error::deserialize(de).map_err(CardioError::from_path_error)?;
        cfg.cache.validate()?;
        Ok(cfg)
    }

    /// Leser konfig fra disk. Mangler filen, brukes default.
    pub fn load(path: impl AsRef<Path>) -> CardioResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("fant ikke konfig på {}, bruker default", path.display());
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let cfg = Self::from_json(&contents)?;
        log::info!(
            "konfig lastet fra {} (interval={}ms)",
            path.display(),
            cfg.cache.persist_interval_ms
        );
        Ok(cfg)
    }
}
