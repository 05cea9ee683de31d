//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`relay`] — Passive lobby message relay
//! - [`system`] — Liveness, health, OpenAPI

mod relay;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use relay::*;
pub use system::*;
