//! HTTP request handlers.

use super::types::{AuthRequest, AuthRequestResponse, HealthResponse};
use super::AppState;
use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use handshake_store::HandshakeStatus;
use tracing::info;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let pending = state.store.pending_count().await;
    let chat_healthy = state.chat.health_check().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        pending_handshakes: pending,
        chat_api_healthy: chat_healthy,
    })
}

/// Start a login and post its confirmation prompt.
///
/// Bodies that are not a JSON object of the expected shape are validation
/// errors like any other bad input.
pub async fn request_auth(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthRequestResponse>, ApiError> {
    let Json(request) = payload?;

    let issued = state
        .store
        .create(
            &request.owner_id,
            &request.owner_name,
            request.client_hint.as_deref(),
        )
        .await?;

    info!(owner_id = %request.owner_id, "Login prompt issued");

    Ok(Json(AuthRequestResponse {
        success: true,
        token: issued.token,
    }))
}

/// Poll a login. Unknown and expired tokens both answer `expired`.
pub async fn check_auth(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Json<HandshakeStatus> {
    Json(state.store.check(&token).await)
}
