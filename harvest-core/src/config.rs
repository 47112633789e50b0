//! TOML configuration for the collector and its provider.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! [collector]
//! period = "1mo"
//! interval = "1d"
//! prefix = "stock_data"
//! storage_dir = "data"
//! naming = "deterministic"
//!
//! [provider]
//! timeout_secs = 30
//! adjust = true
//! base_url = "https://query2.finance.yahoo.com"
//! ```

use crate::data::store::{FileNaming, DEFAULT_PREFIX, DEFAULT_STORAGE_DIR};
use crate::data::yahoo::DEFAULT_BASE_URL;
use crate::domain::{Interval, Period};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarvestConfig {
    pub collector: CollectorConfig,
    pub provider: ProviderConfig,
}

/// Defaults for requests and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectorConfig {
    pub period: Period,
    pub interval: Interval,
    pub prefix: String,
    pub storage_dir: PathBuf,
    pub naming: FileNaming,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            period: Period::default(),
            interval: Interval::default(),
            prefix: DEFAULT_PREFIX.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            naming: FileNaming::default(),
        }
    }
}

/// HTTP settings for the market-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Whole-request timeout; there are no retries.
    pub timeout_secs: u64,
    /// Fold splits and dividends into OHLC using the adjusted close.
    pub adjust: bool,
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            adjust: true,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl HarvestConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collector.prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("collector.prefix must not be empty".into()));
        }
        if self.collector.prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "collector.prefix '{}' must not contain path separators",
                self.collector.prefix
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}
