//! Delivery batching for feed entries
//!
//! The batcher runs as its own task, fed by the poll loop over an mpsc
//! channel. In immediate mode every entry becomes one webhook call. In batched
//! mode entries accumulate and a separate timer flushes them as one
//! newline-joined payload.

use crate::types::Entry;
use crate::webhook::{Notifier, format_batch, format_entry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

/// How accepted entries are turned into webhook calls
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryMode {
    /// One call per entry, as soon as it arrives
    Immediate,
    /// One call per non-empty flush, every `delay`
    Batched {
        /// Flush period
        delay: Duration,
    },
}

impl DeliveryMode {
    /// Pick the mode for a configured batch delay (zero = immediate)
    pub fn from_delay(delay: Duration) -> Self {
        if delay.is_zero() {
            DeliveryMode::Immediate
        } else {
            DeliveryMode::Batched { delay }
        }
    }
}

/// Owns the pending batch and decides when entries are sent
pub struct DeliveryBatcher {
    notifier: Arc<dyn Notifier>,
    mode: DeliveryMode,
    pending: Vec<Entry>,
}

impl DeliveryBatcher {
    /// Create a batcher delivering through `notifier`
    pub fn new(notifier: Arc<dyn Notifier>, mode: DeliveryMode) -> Self {
        Self {
            notifier,
            mode,
            pending: Vec::new(),
        }
    }

    /// Delivery mode in effect
    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    /// Entries waiting for the next flush
    pub fn pending(&self) -> &[Entry] {
        &self.pending
    }

    /// Take new entries from a poll cycle
    ///
    /// Immediate mode sends each entry in order, awaiting each call; a failed
    /// send does not stop the ones after it. Batched mode only queues.
    pub async fn accept(&mut self, entries: Vec<Entry>) {
        match self.mode {
            DeliveryMode::Immediate => {
                for entry in entries {
                    if let Err(e) = self.notifier.send(&format_entry(&entry)).await {
                        tracing::debug!(author = %entry.author, error = %e, "entry not delivered");
                    }
                }
            }
            DeliveryMode::Batched { .. } => self.pending.extend(entries),
        }
    }

    /// Send everything pending as one payload and clear the batch
    ///
    /// The batch is cleared whether or not the send succeeds. Returns the
    /// number of entries that were flushed.
    pub async fn flush(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }

        let batch = std::mem::take(&mut self.pending);
        let content = format_batch(&batch);
        match self.notifier.send(&content).await {
            Ok(()) => tracing::debug!(count = batch.len(), "flushed batch"),
            Err(e) => tracing::warn!(count = batch.len(), error = %e, "batch dropped after failed send"),
        }
        batch.len()
    }

    /// Run the batcher as a background task
    ///
    /// The task ends when every sender of `entries_rx` is dropped, after one
    /// last flush of anything still pending.
    pub fn spawn(mut self, mut entries_rx: mpsc::Receiver<Vec<Entry>>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mode = self.mode;
            match mode {
                DeliveryMode::Immediate => {
                    while let Some(entries) = entries_rx.recv().await {
                        self.accept(entries).await;
                    }
                }
                DeliveryMode::Batched { delay } => {
                    let mut interval = tokio::time::interval_at(Instant::now() + delay, delay);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

                    loop {
                        tokio::select! {
                            msg = entries_rx.recv() => {
                                let Some(entries) = msg else {
                                    // Channel closed
                                    break;
                                };
                                self.accept(entries).await;
                            }
                            _ = interval.tick() => {
                                self.flush().await;
                            }
                        }
                    }

                    self.flush().await;
                }
            }
            tracing::debug!("delivery batcher stopped");
        })
    }
}
