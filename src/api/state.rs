//! Application state for the API server

use crate::{Config, LobbyRelay};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the relay instance and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The running relay
    pub relay: Arc<LobbyRelay>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(relay: Arc<LobbyRelay>, config: Arc<Config>) -> Self {
        Self { relay, config }
    }
}
