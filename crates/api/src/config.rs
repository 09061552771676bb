//! Environment-based configuration for the widget core.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default | Description                          |
//! |--------------------------|----------|---------|--------------------------------------|
//! | `SAIA_API_HOST`          | yes      | --      | Base API URL, e.g. `https://host/api/v2` |
//! | `SAIA_API_KEY`           | yes      | --      | API key sent as `Authorization: APIKey …` |
//! | `SAIA_SYNC_INTERVAL_MS`  | no       | `3000`  | Cross-device flow polling interval   |
//! | `SAIA_QUEUE_INTERVAL_MS` | no       | `1000`  | Calculation result polling interval  |

use std::time::Duration;

/// Default interval between flow record polls on the initiating device.
pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 3000;

/// Default interval between calculation result polls.
pub const DEFAULT_QUEUE_INTERVAL_MS: u64 = 1000;

/// Configuration for the remote clients and polling loops.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub api_host: String,
    pub api_key: String,
    pub sync_interval: Duration,
    pub queue_interval: Duration,
}

/// Errors loading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
}

impl WidgetConfig {
    /// Create a config with the default polling intervals.
    pub fn new(api_host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into(),
            api_key: api_key.into(),
            sync_interval: Duration::from_millis(DEFAULT_SYNC_INTERVAL_MS),
            queue_interval: Duration::from_millis(DEFAULT_QUEUE_INTERVAL_MS),
        }
    }

    /// Load configuration from the environment (and a `.env` file if
    /// one is present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_host = std::env::var("SAIA_API_HOST")
            .map_err(|_| ConfigError::MissingVar("SAIA_API_HOST"))?;
        let api_key =
            std::env::var("SAIA_API_KEY").map_err(|_| ConfigError::MissingVar("SAIA_API_KEY"))?;

        let mut config = Self::new(api_host, api_key);
        config.sync_interval =
            interval_from_env("SAIA_SYNC_INTERVAL_MS", DEFAULT_SYNC_INTERVAL_MS);
        config.queue_interval =
            interval_from_env("SAIA_QUEUE_INTERVAL_MS", DEFAULT_QUEUE_INTERVAL_MS);
        Ok(config)
    }
}

fn interval_from_env(var: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}
