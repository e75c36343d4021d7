use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{ConsentPolicy, Settings};

/// Root relay configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `APP_EVENTS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub destination: DestinationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_min_backoff_ms")]
    pub min_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DestinationConfig {
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub advertiser_id: Option<String>,
    #[serde(default)]
    pub app_events: HashMap<String, String>,
    #[serde(default)]
    pub consent_policy: ConsentPolicy,
}

// Default functions
fn default_endpoint() -> String {
    "https://graph.facebook.com/2.6/".to_string()
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_max_retries() -> usize {
    2
}
fn default_min_backoff_ms() -> u64 {
    100
}
fn default_max_backoff_ms() -> u64 {
    2_000
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            min_backoff_ms: default_min_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            delivery: DeliveryConfig::default(),
            destination: DestinationConfig::default(),
        }
    }
}

impl DeliveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn min_backoff(&self) -> Duration {
        Duration::from_millis(self.min_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl DestinationConfig {
    /// Per-call settings snapshot handed to the mapper.
    pub fn settings(&self) -> Settings {
        Settings {
            app_id: self.app_id.clone(),
            advertiser_id: self.advertiser_id.clone(),
            app_events: self.app_events.clone(),
            consent_policy: self.consent_policy,
        }
    }
}

impl RelayConfig {
    /// Load configuration from an optional config file, then environment
    /// variables (which take precedence).
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("APP_EVENTS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
