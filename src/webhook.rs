//! Discord webhook delivery
//!
//! [`Notifier`] is the seam between the relay and the outbound channel. The
//! production implementation is [`WebhookSender`], which posts
//! `{"content": ...}` to the configured webhook URL once per call.

use crate::config::{ENV_WEBHOOK_URL, WebhookConfig};
use crate::error::{Error, Result};
use crate::types::{Entry, WebhookPayload};
use async_trait::async_trait;

/// Render one entry as a chat line
pub fn format_entry(entry: &Entry) -> String {
    format!("💬 **{}:** {}", entry.author, entry.text)
}

/// Render several entries as one newline-separated payload
pub fn format_batch(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trait for delivering formatted text to the outbound channel
///
/// Implementations make a single best-effort attempt per call and never
/// retry. Failures are logged by the implementation and also returned so
/// that synchronous callers (the relay endpoint) can report them.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one payload
    ///
    /// # Errors
    ///
    /// Returns error if the destination is unconfigured, unreachable, or
    /// answers with a non-success status
    async fn send(&self, content: &str) -> Result<()>;
}

/// Posts messages to a Discord webhook
pub struct WebhookSender {
    /// HTTP client for webhook requests
    http_client: reqwest::Client,

    /// Destination URL, if configured
    url: Option<String>,

    /// Origin of `url`, safe to log. The path carries the webhook token.
    redacted_url: String,
}

impl WebhookSender {
    /// Create a sender from the webhook configuration
    ///
    /// An unset URL is accepted here; every later send is skipped and logged
    /// as a configuration error.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &WebhookConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create webhook HTTP client: {e}"),
                key: None,
            })?;

        Ok(Self {
            http_client,
            redacted_url: config.url.as_deref().map(redact_url).unwrap_or_default(),
            url: config.url.clone(),
        })
    }

    /// Whether a destination URL is configured
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

#[async_trait]
impl Notifier for WebhookSender {
    async fn send(&self, content: &str) -> Result<()> {
        let Some(url) = &self.url else {
            tracing::error!(key = ENV_WEBHOOK_URL, "webhook URL not configured, message dropped");
            return Err(Error::config(ENV_WEBHOOK_URL, "webhook URL is not configured"));
        };

        let payload = WebhookPayload {
            content: content.to_string(),
        };

        match self.http_client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(url = %self.redacted_url, "webhook sent successfully");
                Ok(())
            }
            Ok(response) => {
                let status = response.status().as_u16();
                tracing::warn!(url = %self.redacted_url, status, "webhook failed");
                Err(Error::HttpStatus {
                    url: self.redacted_url.clone(),
                    status,
                })
            }
            Err(e) => {
                let e = e.without_url();
                tracing::warn!(url = %self.redacted_url, error = %e, "webhook failed");
                Err(Error::Network(e))
            }
        }
    }
}

/// Reduce a webhook URL to its origin so the token in the path never reaches
/// logs or error text
fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => parsed.origin().ascii_serialization(),
        Err(_) => "<webhook>".to_string(),
    }
}
