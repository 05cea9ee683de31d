//! Core types shared by the feed pipeline and the relay endpoint

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One chat message with its author
///
/// Entries are produced by the feed parser or built from an inbound relay
/// request, and never change afterwards. Their order is the order in which
/// they appear in the feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Display name of the player who wrote the message
    pub author: String,
    /// Message body
    pub text: String,
}

impl Entry {
    /// Create a new entry
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }
}

/// JSON body sent to the webhook
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Formatted message text
    pub content: String,
}

/// Request body for POST /lobby-message
///
/// Both fields are optional at the type level so that a missing field is
/// reported as `Invalid payload` rather than a framework rejection.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct RelayRequest {
    /// Player name
    #[serde(default)]
    pub player: Option<String>,
    /// Chat message
    #[serde(default)]
    pub message: Option<String>,
}

impl RelayRequest {
    /// Convert into an [`Entry`], rejecting missing or empty fields
    pub fn into_entry(self) -> crate::Result<Entry> {
        match (self.player, self.message) {
            (Some(player), Some(message)) if !player.is_empty() && !message.is_empty() => {
                Ok(Entry::new(player, message))
            }
            _ => Err(crate::Error::InvalidPayload(
                "both player and message are required".to_string(),
            )),
        }
    }
}

/// Response body for a successful POST /lobby-message
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RelayResponse {
    /// Always "sent"
    pub status: String,
}

impl RelayResponse {
    /// The success response
    pub fn sent() -> Self {
        Self {
            status: "sent".to_string(),
        }
    }
}
