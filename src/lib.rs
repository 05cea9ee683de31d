//! # lobby-relay
//!
//! Relays game lobby chat into a Discord webhook.
//!
//! Two paths feed the same webhook:
//! - **Passive relay** - `POST /lobby-message` with `{player, message}` is
//!   formatted and sent straight away.
//! - **Feed relay** - a poller fetches a plain-text chat feed on an interval,
//!   re-parses it, forwards only entries past its watermark, and delivers them
//!   one by one or in timed batches.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lobby_relay::{Config, LobbyRelay, run_with_shutdown};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let relay = Arc::new(LobbyRelay::new(config)?);
//!
//!     relay.start_feed_relay()?;
//!     let _api = relay.spawn_api_server();
//!
//!     run_with_shutdown(relay).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP API module
pub mod api;
/// Delivery batching
pub mod batcher;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Lobby chat feed fetching, parsing and watermarking
pub mod feed;
/// Feed polling loop
pub mod poller;
/// Relay service wiring and lifecycle
pub mod relay;
/// Core types
pub mod types;
/// Discord webhook delivery
pub mod webhook;

// Re-export commonly used types
pub use batcher::{DeliveryBatcher, DeliveryMode};
pub use config::Config;
pub use error::{ApiError, Error, Result, ToHttpStatus};
pub use feed::{FeedFetcher, Watermark, parse_feed};
pub use poller::FeedPoller;
pub use relay::LobbyRelay;
pub use types::{Entry, RelayRequest, RelayResponse, WebhookPayload};
pub use webhook::{Notifier, WebhookSender, format_entry};

/// Helper function to run the relay with graceful signal handling.
///
/// Waits for a termination signal and then calls the relay's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_with_shutdown(relay: std::sync::Arc<LobbyRelay>) -> Result<()> {
    wait_for_signal().await;
    relay.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
