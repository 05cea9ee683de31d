//! Relay service: wiring, lifecycle and the passive relay path

use crate::Result;
use crate::batcher::{DeliveryBatcher, DeliveryMode};
use crate::config::Config;
use crate::feed::FeedFetcher;
use crate::poller::FeedPoller;
use crate::types::Entry;
use crate::webhook::{Notifier, WebhookSender, format_entry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Capacity of the poller -> batcher queue, in poll cycles
const ENTRY_QUEUE_CAPACITY: usize = 64;

/// The running relay
///
/// Holds the shared notifier used by both the feed pipeline and the relay
/// endpoint, plus the handles needed to shut the background tasks down.
pub struct LobbyRelay {
    /// Relay configuration
    pub config: Arc<Config>,

    notifier: Arc<dyn Notifier>,

    cancel: CancellationToken,

    feed_started: AtomicBool,

    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl LobbyRelay {
    /// Create a relay that delivers to the configured Discord webhook
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        if config.webhook.url.is_none() {
            tracing::warn!("DISCORD_WEBHOOK_URL is not set; messages will be dropped");
        }
        let sender = WebhookSender::new(&config.webhook)?;
        Ok(Self::with_notifier(config, Arc::new(sender)))
    }

    /// Create a relay with a custom notifier
    pub fn with_notifier(config: Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config: Arc::new(config),
            notifier,
            cancel: CancellationToken::new(),
            feed_started: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Token cancelled when the relay shuts down
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the feed pipeline is configured
    pub fn feed_enabled(&self) -> bool {
        self.config.feed.url.is_some()
    }

    /// Format and send one message straight to the webhook
    ///
    /// # Errors
    /// Returns error if the webhook send fails
    pub async fn relay(&self, entry: &Entry) -> Result<()> {
        tracing::info!(player = %entry.author, "relaying lobby message");
        self.notifier.send(&format_entry(entry)).await
    }

    /// Start the feed poller and delivery batcher
    ///
    /// Does nothing and returns `false` when no feed URL is configured or the
    /// feed relay is already running. A second poller would start from an
    /// empty watermark and resend the whole feed.
    ///
    /// # Errors
    /// Returns error if the feed HTTP client cannot be built
    pub fn start_feed_relay(&self) -> Result<bool> {
        let Some(url) = self.config.feed.url.clone() else {
            tracing::info!("LOBBY_FEED_URL is not set; feed polling disabled");
            return Ok(false);
        };

        if self.feed_started.swap(true, Ordering::SeqCst) {
            tracing::warn!("feed relay already started");
            return Ok(false);
        }

        let feed = &self.config.feed;
        let mode = DeliveryMode::from_delay(feed.batch_delay);
        tracing::info!(url = %url, mode = ?mode, "starting feed relay");

        let fetcher = match FeedFetcher::new(url, feed) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                self.feed_started.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };
        let (entries_tx, entries_rx) = mpsc::channel(ENTRY_QUEUE_CAPACITY);

        let batcher = DeliveryBatcher::new(self.notifier.clone(), mode).spawn(entries_rx);
        let poller = FeedPoller::new(fetcher, feed.delimiter, feed.poll_interval, entries_tx);
        let poller = tokio::spawn(poller.run(self.cancel.clone()));

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(poller);
            tasks.push(batcher);
        }
        Ok(true)
    }

    /// Spawn the REST API server in a background task
    pub fn spawn_api_server(self: &Arc<Self>) -> JoinHandle<Result<()>> {
        let relay = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(relay, config).await })
    }

    /// Stop polling, flush pending batches and stop the API server
    ///
    /// # Errors
    /// Currently infallible; kept fallible to match the server lifecycle
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");
        self.cancel.cancel();

        let tasks = match self.tasks.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(_) => Vec::new(),
        };

        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "background task ended abnormally");
            }
        }

        tracing::info!("Shutdown complete");
        Ok(())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::batcher::tests::RecordingNotifier;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_relay_formats_and_sends() {
        let notifier = Arc::new(RecordingNotifier::default());
        let relay = LobbyRelay::with_notifier(Config::default(), notifier.clone());

        relay.relay(&Entry::new("Alice", "gg")).await.unwrap();
        assert_eq!(notifier.sent(), vec!["💬 **Alice:** gg".to_string()]);
    }

    #[tokio::test]
    async fn test_start_without_feed_url_is_noop() {
        let relay =
            LobbyRelay::with_notifier(Config::default(), Arc::new(RecordingNotifier::default()));
        assert!(!relay.feed_enabled());
        assert!(!relay.start_feed_relay().unwrap());
        relay.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[1] [Alice] hi ~"))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.feed.url = Some(format!("{}/chat", server.uri()));
        config.feed.poll_interval = Duration::from_millis(20);
        config.feed.batch_delay = Duration::from_secs(3600);

        let notifier = Arc::new(RecordingNotifier::default());
        let relay = LobbyRelay::with_notifier(config, notifier.clone());
        assert!(relay.start_feed_relay().unwrap());

        // Wait for at least one poll to hit the feed
        for _ in 0..100 {
            if !server.received_requests().await.unwrap_or_default().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(notifier.sent().is_empty(), "batch period has not elapsed");

        relay.shutdown().await.unwrap();
        assert_eq!(notifier.sent(), vec!["💬 **Alice:** hi".to_string()]);
    }

    #[tokio::test]
    async fn test_second_start_is_noop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[1] [Alice] hi ~"))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.feed.url = Some(format!("{}/chat", server.uri()));
        config.feed.poll_interval = Duration::from_millis(20);

        let notifier = Arc::new(RecordingNotifier::default());
        let relay = LobbyRelay::with_notifier(config, notifier.clone());
        assert!(relay.start_feed_relay().unwrap());
        assert!(!relay.start_feed_relay().unwrap());

        for _ in 0..100 {
            if !notifier.sent().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        // Several more poll cycles
        tokio::time::sleep(Duration::from_millis(150)).await;
        relay.shutdown().await.unwrap();

        assert_eq!(notifier.sent(), vec!["💬 **Alice:** hi".to_string()]);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.feed.poll_interval = Duration::ZERO;
        assert!(LobbyRelay::new(config).is_err());
    }
}
