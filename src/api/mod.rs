//! HTTP API server module
//!
//! Exposes the passive relay endpoint plus liveness and documentation routes.

use crate::{Config, LobbyRelay, Result};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Relay
/// - `POST /lobby-message` - Relay one `{player, message}` chat line to Discord
///
/// ## System
/// - `GET /` - Plaintext liveness string
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
pub fn create_router(relay: Arc<LobbyRelay>, config: Arc<Config>) -> Router {
    let state = AppState::new(relay, config);

    Router::new()
        // Relay
        .route("/lobby-message", post(routes::relay_lobby_message))
        // System
        .route("/", get(routes::liveness))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the API server on the configured bind address.
///
/// Runs until the relay's cancellation token fires, then finishes in-flight
/// requests and returns.
///
/// # Example
///
/// ```no_run
/// use lobby_relay::{Config, LobbyRelay};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::from_env()?;
/// let relay = Arc::new(LobbyRelay::new(config)?);
///
/// // Start API server (blocks until shutdown)
/// lobby_relay::api::start_api_server(relay.clone(), relay.config.clone()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(relay: Arc<LobbyRelay>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.api.bind_address;
    let shutdown = relay.cancellation_token();

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(relay, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "Webhook relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
