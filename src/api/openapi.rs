//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the lobby-relay HTTP API
//! using utoipa for compile-time document generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the lobby-relay HTTP API
///
/// Served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "lobby-relay HTTP API",
        version = "0.1.0",
        description = "Relays game lobby chat messages into a Discord webhook",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        crate::api::routes::relay_lobby_message,
        crate::api::routes::liveness,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::types::RelayRequest,
            crate::types::RelayResponse,
            crate::error::ApiError,
        )
    ),
    tags(
        (name = "relay", description = "Lobby message relay"),
        (name = "system", description = "Liveness, health and documentation")
    )
)]
pub struct ApiDoc;
