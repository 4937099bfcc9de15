//! Configuration for queryables and summaries discovery

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timestamp keys from STAC common metadata, routed through the date fast path
pub const DEFAULT_DATETIME_KEYS: &[&str] = &[
    "datetime",
    "start_datetime",
    "end_datetime",
    "created",
    "updated",
    "published",
    "expires",
    "unpublished",
];

/// Disables custom queryables discovery when set to `1`
pub const ENV_DEFAULT_QUERYABLES: &str = "STAC_DEFAULT_QUERYABLES";
/// Disables custom summaries discovery when set to `1`
pub const ENV_DEFAULT_SUMMARIES: &str = "STAC_DEFAULT_SUMMARIES";
/// Overrides the queryables sampling percentage
pub const ENV_SAMPLING_PERCENT: &str = "STAC_QUERYABLES_SAMPLING_PERCENT";
/// Overrides the minimum expected sample size
pub const ENV_MIN_SAMPLE_ROWS: &str = "STAC_QUERYABLES_MIN_SAMPLE_ROWS";

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Configuration for discovery runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscoveryConfig {
    /// Percentage of items sampled for queryables (0.0 exclusive - 100.0)
    pub sampling_percent: f64,

    /// Minimum expected sample size; smaller samples escalate to a full scan
    pub min_sample_rows: u64,

    /// Restrict queryables to scalar properties in [`update_queryables`] and
    /// the configured discovery entry points
    ///
    /// [`update_queryables`]: crate::discovery::update_queryables
    pub minimal: bool,

    /// Property keys handled by the date fast path
    pub datetime_keys: Vec<String>,

    /// Run custom queryables discovery on refresh
    pub custom_queryables: bool,

    /// Run custom summaries and extents discovery on refresh
    pub custom_summaries: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            sampling_percent: 10.0,
            min_sample_rows: 10,
            minimal: false,
            datetime_keys: DEFAULT_DATETIME_KEYS.iter().map(|k| k.to_string()).collect(),
            custom_queryables: true,
            custom_summaries: true,
        }
    }
}

impl DiscoveryConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> DiscoveryConfigBuilder {
        DiscoveryConfigBuilder::default()
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Defaults overridden by the given environment variables
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let value = value.as_ref().trim();
            match key.as_ref() {
                ENV_DEFAULT_QUERYABLES => config.custom_queryables = value != "1",
                ENV_DEFAULT_SUMMARIES => config.custom_summaries = value != "1",
                ENV_SAMPLING_PERCENT => {
                    config.sampling_percent = value
                        .parse()
                        .map_err(|e| ConfigError::invalid(ENV_SAMPLING_PERCENT, format!("{e}")))?;
                }
                ENV_MIN_SAMPLE_ROWS => {
                    config.min_sample_rows = value
                        .parse()
                        .map_err(|e| ConfigError::invalid(ENV_MIN_SAMPLE_ROWS, format!("{e}")))?;
                }
                _ => {}
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sampling_percent > 0.0 && self.sampling_percent <= 100.0) {
            return Err(ConfigError::invalid(
                "samplingPercent",
                format!("{} is outside (0, 100]", self.sampling_percent),
            ));
        }
        Ok(())
    }

    /// Whether `key` goes through the date fast path
    pub fn is_datetime_key(&self, key: &str) -> bool {
        self.datetime_keys.iter().any(|k| k == key)
    }
}

/// Builder for DiscoveryConfig
#[derive(Debug, Default)]
pub struct DiscoveryConfigBuilder {
    config: DiscoveryConfig,
}

impl DiscoveryConfigBuilder {
    /// Set the sampling percentage, clamped to (0, 100]
    pub fn sampling_percent(mut self, percent: f64) -> Self {
        self.config.sampling_percent = percent.clamp(f64::MIN_POSITIVE, 100.0);
        self
    }

    /// Set the minimum expected sample size
    pub fn min_sample_rows(mut self, rows: u64) -> Self {
        self.config.min_sample_rows = rows;
        self
    }

    /// Enable or disable minimal queryables
    pub fn minimal(mut self, minimal: bool) -> Self {
        self.config.minimal = minimal;
        self
    }

    /// Replace the date fast path keys
    pub fn datetime_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.datetime_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable custom queryables discovery
    pub fn custom_queryables(mut self, enabled: bool) -> Self {
        self.config.custom_queryables = enabled;
        self
    }

    /// Enable or disable custom summaries discovery
    pub fn custom_summaries(mut self, enabled: bool) -> Self {
        self.config.custom_summaries = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> DiscoveryConfig {
        self.config
    }
}
