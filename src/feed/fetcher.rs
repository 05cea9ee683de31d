//! Feed retrieval over HTTP

use crate::config::FeedConfig;
use crate::error::{Error, Result};
use tracing::debug;

/// Fetches the raw feed text with a single bounded GET per call
#[derive(Clone, Debug)]
pub struct FeedFetcher {
    /// HTTP client for fetching the feed
    http_client: reqwest::Client,

    /// Feed URL
    url: String,
}

impl FeedFetcher {
    /// Create a new fetcher for `url`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(url: impl Into<String>, config: &FeedConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("lobby-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create feed HTTP client: {e}"),
                key: None,
            })?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    /// Feed URL this fetcher polls
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the feed body as text
    ///
    /// # Errors
    /// Returns error if the request fails, times out, the server answers with
    /// a non-success status, or the body cannot be read
    pub async fn fetch(&self) -> Result<String> {
        debug!(url = %self.url, "fetching lobby feed");

        let response = self.http_client.get(&self.url).send().await?;

        // Check HTTP status before reading the body
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
