//! Slack incoming-webhook sender.

use crate::config::Config;
use crate::error::{BriefError, Result};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Posts plain-text messages to a fixed incoming-webhook URL.
pub struct Notifier {
    http: reqwest::Client,
    webhook_url: String,
}

impl Notifier {
    /// Build a notifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BriefError::Notify`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BriefError::Notify(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            webhook_url: config.slack_webhook_url.clone(),
        })
    }

    /// Send one message. Success is silent; failure carries the HTTP
    /// status and response body.
    ///
    /// # Errors
    ///
    /// Returns [`BriefError::Notify`] on transport failure or a non-2xx
    /// response.
    pub async fn send(&self, text: &str) -> Result<()> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| BriefError::Notify(format!("webhook request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BriefError::Notify(format!(
                "webhook returned {status}: {body}"
            )));
        }

        debug!("notification delivered ({} chars)", text.chars().count());
        Ok(())
    }
}
