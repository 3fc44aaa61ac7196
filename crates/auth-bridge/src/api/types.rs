//! API request and response types.

use serde::{Deserialize, Serialize};

/// Request to start a login.
///
/// Missing fields are left empty so they surface as validation errors.
/// The camelCase aliases match what existing dashboards send.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    #[serde(default, alias = "userId")]
    pub owner_id: String,

    #[serde(default, alias = "userName")]
    pub owner_name: String,

    /// Where the login came from, shown in the prompt
    #[serde(default, alias = "userIp")]
    pub client_hint: Option<String>,
}

/// Response after a prompt was posted.
#[derive(Debug, Serialize)]
pub struct AuthRequestResponse {
    pub success: bool,
    pub token: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub pending_handshakes: usize,
    pub chat_api_healthy: bool,
}
