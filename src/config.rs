//! Configuration types for lobby-relay
//!
//! Configuration is environment-style. [`Config::from_env`] reads the process
//! environment (the binary loads `.env` first); [`Config::from_lookup`] takes
//! any key lookup so tests never touch the real environment.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, SocketAddr},
    str::FromStr,
    time::Duration,
};

/// Environment key for the Discord webhook URL
pub const ENV_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";
/// Environment key for the polled feed URL
pub const ENV_FEED_URL: &str = "LOBBY_FEED_URL";
/// Environment key for the inbound listen port
pub const ENV_PORT: &str = "PORT";
/// Environment key for the inbound listen address
pub const ENV_BIND_HOST: &str = "BIND_HOST";
/// Environment key for the poll period in milliseconds
pub const ENV_POLL_INTERVAL_MS: &str = "POLL_INTERVAL_MS";
/// Environment key for the batch delay in milliseconds (0 = immediate)
pub const ENV_BATCH_DELAY_MS: &str = "BATCH_DELAY_MS";
/// Environment key for the feed segment delimiter
pub const ENV_FEED_DELIMITER: &str = "FEED_DELIMITER";
/// Environment key for the webhook request timeout in seconds
pub const ENV_WEBHOOK_TIMEOUT_SECS: &str = "WEBHOOK_TIMEOUT_SECS";
/// Environment key for the feed request timeout in seconds
pub const ENV_FEED_TIMEOUT_SECS: &str = "FEED_TIMEOUT_SECS";

/// Outbound webhook configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URL to POST to (None = sends are skipped and logged)
    #[serde(default)]
    pub url: Option<String>,

    /// Timeout for webhook requests (default: 10 seconds)
    #[serde(default = "default_request_timeout", with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: default_request_timeout(),
        }
    }
}

/// Polled feed configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed URL (None = poller disabled, passive relay only)
    #[serde(default)]
    pub url: Option<String>,

    /// How often to poll the feed (default: 5 seconds)
    #[serde(default = "default_poll_interval", with = "duration_millis")]
    pub poll_interval: Duration,

    /// Batch flush period; zero sends every entry immediately (default: 0)
    #[serde(default, with = "duration_millis")]
    pub batch_delay: Duration,

    /// Character separating feed segments (default: '~')
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Timeout for feed requests (default: 10 seconds)
    #[serde(default = "default_request_timeout", with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: None,
            poll_interval: default_poll_interval(),
            batch_delay: Duration::ZERO,
            delimiter: default_delimiter(),
            timeout: default_request_timeout(),
        }
    }
}

/// Inbound HTTP API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:3000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Main configuration for the relay
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Outbound webhook settings
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Feed polling and batching settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Inbound API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Build a configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    ///
    /// Unset or blank keys fall back to defaults. Values that are present but
    /// unparsable are reported as [`Error::Config`] naming the offending key.
    /// `FEED_DELIMITER` is taken verbatim, so a single whitespace character is
    /// a valid delimiter.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port: u16 = parse_or(&get, ENV_PORT, default_bind_address().port())?;
        let host: IpAddr = parse_or(&get, ENV_BIND_HOST, default_bind_address().ip())?;

        // Read untrimmed: newline, tab and space are valid delimiters
        let delimiter = match lookup(ENV_FEED_DELIMITER).filter(|v| !v.is_empty()) {
            None => default_delimiter(),
            Some(raw) => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => {
                        return Err(Error::config(
                            ENV_FEED_DELIMITER,
                            format!("{ENV_FEED_DELIMITER} must be a single character, got {raw:?}"),
                        ));
                    }
                }
            }
        };

        let config = Config {
            webhook: WebhookConfig {
                url: get(ENV_WEBHOOK_URL),
                timeout: Duration::from_secs(parse_or(
                    &get,
                    ENV_WEBHOOK_TIMEOUT_SECS,
                    default_request_timeout().as_secs(),
                )?),
            },
            feed: FeedConfig {
                url: get(ENV_FEED_URL),
                poll_interval: Duration::from_millis(parse_or(
                    &get,
                    ENV_POLL_INTERVAL_MS,
                    default_poll_interval().as_millis() as u64,
                )?),
                batch_delay: Duration::from_millis(parse_or(&get, ENV_BATCH_DELAY_MS, 0)?),
                delimiter,
                timeout: Duration::from_secs(parse_or(
                    &get,
                    ENV_FEED_TIMEOUT_SECS,
                    default_request_timeout().as_secs(),
                )?),
            },
            api: ApiConfig {
                bind_address: SocketAddr::new(host, port),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.webhook.url {
            validate_http_url(ENV_WEBHOOK_URL, url)?;
        }
        if let Some(url) = &self.feed.url {
            validate_http_url(ENV_FEED_URL, url)?;
        }
        if self.feed.poll_interval.is_zero() {
            return Err(Error::config(
                ENV_POLL_INTERVAL_MS,
                "poll interval must be greater than zero",
            ));
        }
        if self.webhook.timeout.is_zero() || self.feed.timeout.is_zero() {
            return Err(Error::Config {
                message: "request timeouts must be greater than zero".to_string(),
                key: None,
            });
        }
        Ok(())
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::config(key, format!("invalid {key} value {raw:?}: {e}"))),
    }
}

fn validate_http_url(key: &str, raw: &str) -> Result<()> {
    let parsed =
        url::Url::parse(raw).map_err(|e| Error::config(key, format!("invalid {key}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::config(
            key,
            format!("{key} must use http or https, got {other}"),
        )),
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_delimiter() -> char {
    crate::feed::DEFAULT_DELIMITER
}

// Duration serialization helpers
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
