//! Passive relay handler.

use crate::api::AppState;
use crate::error::{ApiError, Error};
use crate::types::{RelayRequest, RelayResponse};
use axum::{Json, extract::State, extract::rejection::JsonRejection};

/// POST /lobby-message - Relay one lobby chat message to Discord
#[utoipa::path(
    post,
    path = "/lobby-message",
    tag = "relay",
    request_body = RelayRequest,
    responses(
        (status = 200, description = "Message delivered to the webhook", body = RelayResponse),
        (status = 400, description = "Missing player or message", body = ApiError),
        (status = 500, description = "Webhook delivery failed", body = ApiError)
    )
)]
pub async fn relay_lobby_message(
    State(state): State<AppState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelayResponse>, Error> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "rejected lobby message body");
        Error::InvalidPayload(e.body_text())
    })?;

    let entry = request.into_entry()?;

    state.relay.relay(&entry).await.map_err(|e| {
        tracing::error!(player = %entry.author, error = %e, "Webhook error");
        Error::Delivery(e.to_string())
    })?;

    Ok(Json(RelayResponse::sent()))
}
