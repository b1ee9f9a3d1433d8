use crate::service::{ErrorMessageStrategy, DEFAULT_ENDPOINT};
use anyhow::{Context, Result};
use std::time::Duration;

/// Settings for one parking finder
#[derive(Debug, Clone, PartialEq)]
pub struct FinderConfig {
    /// URL searches are POSTed to
    pub endpoint: String,
    /// City the form starts with, blank when unset
    pub default_city: Option<String>,
    pub error_messages: ErrorMessageStrategy,
    /// Per-request timeout; requests wait forever when unset
    pub timeout: Option<Duration>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_city: None,
            error_messages: ErrorMessageStrategy::Generic,
            timeout: None,
        }
    }
}

impl FinderConfig {
    /// Read settings from `PARKING_FINDER_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("PARKING_FINDER_ENDPOINT") {
            config.endpoint = endpoint;
        }
        config.default_city = lookup("PARKING_FINDER_DEFAULT_CITY").filter(|c| !c.is_empty());
        if let Some(strategy) = lookup("PARKING_FINDER_ERROR_MESSAGES") {
            config.error_messages = strategy
                .parse()
                .context("Invalid PARKING_FINDER_ERROR_MESSAGES")?;
        }
        if let Some(secs) = lookup("PARKING_FINDER_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .context("Invalid PARKING_FINDER_TIMEOUT_SECS")?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}
