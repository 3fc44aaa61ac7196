//! Auth bridge HTTP client.

use crate::error::BridgeError;
use handshake_store::HandshakeStatus;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use urlencoding::encode;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    owner_id: &'a str,
    owner_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_hint: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    code: String,
}

/// Client for the bridge's `/auth` endpoints.
#[derive(Clone)]
pub struct BridgeClient {
    client: Client,
    base_url: String,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BridgeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Start a login for a chat member; returns the handshake token.
    #[instrument(skip(self, owner_name, client_hint))]
    pub async fn request_login(
        &self,
        owner_id: &str,
        owner_name: &str,
        client_hint: Option<&str>,
    ) -> Result<String, BridgeError> {
        let response = self
            .client
            .post(format!("{}/auth/request", self.base_url))
            .json(&LoginRequest {
                owner_id,
                owner_name,
                client_hint,
            })
            .send()
            .await?;

        let body: LoginResponse = self.handle_response(response).await?;
        debug!("Login requested");
        Ok(body.token)
    }

    /// Current status of a handshake token.
    pub async fn check(&self, token: &str) -> Result<HandshakeStatus, BridgeError> {
        let response = self
            .client
            .get(format!("{}/auth/check/{}", self.base_url, encode(token)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T, BridgeError> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let error: ErrorBody = serde_json::from_slice(&body).unwrap_or_default();
            return Err(BridgeError::Rejected {
                status: status.as_u16(),
                code: error.code,
                message: error.error,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
