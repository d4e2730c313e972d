//! Configuration management for the meguri pipeline
//!
//! Configuration is loaded from environment variables (`MEGURI_*`) or a
//! TOML file, with conservative politeness defaults: the reference behavior
//! against the marketplace is deliberately slow.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fetcher configuration
    pub fetch: FetchConfig,

    /// Notification configuration
    pub notify: NotifyConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Fetcher-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Rate limit (requests per second) shared by crawl and enrichment
    pub rate_limit: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Fixed User-Agent string; empty to rotate through a realistic pool
    pub user_agent: String,
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Webhook URL; empty disables notification
    pub webhook_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let rate_limit = std::env::var("MEGURI_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(2);

        let request_timeout_secs = std::env::var("MEGURI_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let user_agent = std::env::var("MEGURI_USER_AGENT").unwrap_or_default();

        let webhook_url = std::env::var("MEGURI_WEBHOOK_URL").unwrap_or_default();

        let log_level = std::env::var("MEGURI_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));
        let log_format =
            std::env::var("MEGURI_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            fetch: FetchConfig {
                rate_limit,
                request_timeout_secs,
                user_agent,
            },
            notify: NotifyConfig { webhook_url },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fetch.rate_limit == 0 {
            anyhow::bail!("rate_limit must be greater than 0");
        }

        if self.fetch.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if !self.notify.webhook_url.is_empty()
            && !self.notify.webhook_url.starts_with("http://")
            && !self.notify.webhook_url.starts_with("https://")
        {
            anyhow::bail!("webhook_url must be an http(s) URL");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.request_timeout_secs)
    }

    /// User-Agent override, if one is configured
    #[must_use]
    pub fn user_agent(&self) -> Option<String> {
        if self.fetch.user_agent.is_empty() {
            None
        } else {
            Some(self.fetch.user_agent.clone())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig {
                rate_limit: 2,
                request_timeout_secs: 10,
                user_agent: String::new(),
            },
            notify: NotifyConfig {
                webhook_url: String::new(),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
