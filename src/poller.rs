//! Feed polling loop
//!
//! The poller owns the watermark. Each tick it fetches the whole feed,
//! re-parses it, and hands the entries past the watermark to the delivery
//! batcher.
//!
//! Cycles are serialized: the loop awaits a cycle before waiting for the
//! next tick, so two cycles never touch the watermark at once. Ticks missed
//! while a slow cycle was running are coalesced rather than replayed.

use crate::error::{Error, Result};
use crate::feed::{FeedFetcher, Watermark, parse};
use crate::types::Entry;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Periodically polls the lobby feed and forwards new entries
pub struct FeedPoller {
    /// Source of the raw feed text
    fetcher: FeedFetcher,

    /// Segment delimiter of the feed
    delimiter: char,

    /// Time between poll cycles
    interval: Duration,

    /// Last entry already handed to delivery
    watermark: Watermark,

    /// Queue into the delivery batcher
    entries_tx: mpsc::Sender<Vec<Entry>>,
}

impl FeedPoller {
    /// Creates a new feed poller
    ///
    /// # Parameters
    /// - `fetcher`: fetcher for the feed URL
    /// - `delimiter`: segment delimiter of the feed text
    /// - `interval`: time between poll cycles
    /// - `entries_tx`: queue into the delivery batcher
    pub fn new(
        fetcher: FeedFetcher,
        delimiter: char,
        interval: Duration,
        entries_tx: mpsc::Sender<Vec<Entry>>,
    ) -> Self {
        Self {
            fetcher,
            delimiter,
            interval,
            watermark: Watermark::new(),
            entries_tx,
        }
    }

    /// Current watermark
    pub fn watermark(&self) -> Watermark {
        self.watermark
    }

    /// Run a single poll cycle
    ///
    /// Returns the number of new entries handed to the batcher. A fetch
    /// failure leaves the watermark where it was. The watermark moves before
    /// entries are delivered, so an entry whose delivery later fails is not
    /// picked up again.
    ///
    /// # Errors
    /// Returns error if the feed cannot be fetched or the batcher has stopped
    pub async fn poll_once(&mut self) -> Result<usize> {
        let raw = self.fetcher.fetch().await?;
        let feed = parse(&raw, self.delimiter);
        let parsed = feed.len();

        let new_entries = self.watermark.advance(feed);
        if new_entries.is_empty() {
            debug!(url = %self.fetcher.url(), parsed, "no new lobby messages");
            return Ok(0);
        }

        let count = new_entries.len();
        debug!(
            url = %self.fetcher.url(),
            parsed,
            new = count,
            watermark = ?self.watermark.position(),
            "new lobby messages"
        );

        self.entries_tx
            .send(new_entries)
            .await
            .map_err(|_| Error::ChannelClosed)?;

        Ok(count)
    }

    /// Run the poll loop until `cancel` fires or the batcher goes away
    ///
    /// The first cycle runs immediately. A failed cycle is logged and the
    /// loop carries on with the next tick.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            url = %self.fetcher.url(),
            interval = ?self.interval,
            "feed poller started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.poll_once().await {
                        Ok(0) => {}
                        Ok(count) => {
                            info!(url = %self.fetcher.url(), count, "forwarded lobby messages");
                        }
                        Err(Error::ChannelClosed) => {
                            error!("delivery batcher stopped, ending feed poller");
                            break;
                        }
                        Err(e) => {
                            error!(url = %self.fetcher.url(), error = %e, "feed poll failed");
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("feed poller shutting down");
                    break;
                }
            }
        }

        info!("feed poller stopped");
    }
}
