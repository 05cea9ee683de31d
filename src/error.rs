//! Error types for lobby-relay
//!
//! This module provides the error taxonomy for the relay:
//! - Configuration problems (missing or malformed settings)
//! - Transport failures talking to the feed or the webhook
//! - Malformed inbound relay payloads
//! - HTTP status code mapping for the API surface
//!
//! Unparsable feed segments are deliberately absent: the parser drops them
//! without raising anything.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for lobby-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for lobby-relay
///
/// Every failure is terminal to the single operation that hit it. Callers in
/// the feed pipeline log and continue; the relay endpoint converts the error
/// into an HTTP response.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment key that caused the error (e.g., "DISCORD_WEBHOOK_URL")
        key: Option<String>,
    },

    /// Network error (connect failure, timeout, body read failure)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    HttpStatus {
        /// The URL that was requested
        url: String,
        /// The HTTP status code that was returned
        status: u16,
    },

    /// Inbound relay request is missing `player` or `message`
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A relayed message could not be delivered to the webhook
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The delivery batcher is no longer accepting entries
    #[error("delivery channel closed")]
    ChannelClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// API error response format
///
/// ```json
/// { "error": "Invalid payload" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,
}

impl ApiError {
    /// Create a new API error with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client sent something unusable
            Error::InvalidPayload(_) => 400,

            // 500 - Everything else is our side or the webhook's side
            Error::Config { .. } => 500,
            Error::Delivery(_) => 500,
            Error::Network(_) => 500,
            Error::HttpStatus { .. } => 500,
            Error::ChannelClosed => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Network(_) => "network_error",
            Error::HttpStatus { .. } => "http_status",
            Error::InvalidPayload(_) => "invalid_payload",
            Error::Delivery(_) => "delivery_failed",
            Error::ChannelClosed => "channel_closed",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        // Public messages are fixed strings; internal detail stays in the logs
        let message = match &error {
            Error::InvalidPayload(_) => "Invalid payload",
            Error::Delivery(_) | Error::Network(_) | Error::HttpStatus { .. } => {
                "Failed to send to Discord"
            }
            _ => "Internal server error",
        };
        ApiError::new(message)
    }
}
