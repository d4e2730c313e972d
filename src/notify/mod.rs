//! Webhook notification for reconciliation results
//!
//! Pushes a summary of the forward diff to a Discord-compatible webhook as
//! an embed: count in the title, the first few URLs in the body, and an
//! "…and N more" trailer when truncated. Delivery failure is logged by the
//! caller and never fails the run.

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, FetchError, Result};
use crate::models::DiffResult;

/// Maximum number of URLs listed in the embed body
const MAX_LISTED_URLS: usize = 10;

/// Embed accent color (blue)
const EMBED_COLOR: u32 = 3_447_003;

/// Webhook channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URL endpoint
    pub url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    10
}

impl WebhookConfig {
    /// Create a new webhook configuration
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_timeout(),
        }
    }

    /// Set request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.url.is_empty() {
            return Err("Webhook URL cannot be empty".to_string());
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("Webhook URL must start with http:// or https://".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Webhook notification channel
pub struct WebhookNotifier {
    config: WebhookConfig,
    client: Client,
}

impl WebhookNotifier {
    /// Create a new webhook notifier
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an invalid configuration and
    /// `Error::Fetch` when the HTTP client cannot be built
    pub fn new(config: WebhookConfig) -> Result<Self> {
        config.validate().map_err(Error::config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Http)?;

        Ok(Self { config, client })
    }

    /// Create a notifier with just a URL
    ///
    /// # Errors
    ///
    /// See [`WebhookNotifier::new`]
    pub fn from_url(url: impl Into<String>) -> Result<Self> {
        Self::new(WebhookConfig::new(url))
    }

    /// Build the embed payload from a diff result
    fn build_payload(diff: &DiffResult) -> serde_json::Value {
        let count = diff.forward.len();

        let mut description: String = diff
            .forward
            .iter()
            .take(MAX_LISTED_URLS)
            .map(|(_, url)| format!("- {url}\n"))
            .collect();
        if count > MAX_LISTED_URLS {
            description.push_str(&format!("\n…and {} more", count - MAX_LISTED_URLS));
        }

        serde_json::json!({
            "embeds": [{
                "title": format!("🔔 {count} unregistered item(s) found"),
                "description": description,
                "color": EMBED_COLOR,
                "timestamp": Utc::now().to_rfc3339(),
                "footer": { "text": "meguri catalog checker" },
            }]
        })
    }

    /// Send the forward-diff summary
    ///
    /// # Errors
    ///
    /// Returns `Error::Fetch` on transport failure or a non-success status;
    /// callers log this and carry on, delivery is best-effort
    pub async fn send(&self, diff: &DiffResult) -> Result<()> {
        let payload = Self::build_payload(diff);

        let response = self
            .client
            .post(&self.config.url)
            .json(&payload)
            .send()
            .await
            .map_err(FetchError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()).into());
        }

        tracing::info!(count = diff.forward.len(), "Webhook notification delivered");
        Ok(())
    }
}
