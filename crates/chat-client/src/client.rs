//! Chat gateway HTTP client.

use crate::error::ChatError;
use crate::types::*;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Chat platform REST gateway client.
///
/// The bot token is stored using `SecretString` to keep it out of logs and
/// debug output.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    bot_token: SecretString,
}

impl ChatClient {
    /// Create a new chat client.
    pub fn new(
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
    ) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bot_token: SecretString::new(bot_token.into()),
        })
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.bot_token.expose_secret())
    }

    fn channel_url(&self, channel_id: &str) -> String {
        format!("{}/v1/channels/{}/messages", self.base_url, encode(channel_id))
    }

    /// Check if the gateway is healthy.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Post a message to a channel, optionally as a reply.
    #[instrument(skip(self, content))]
    pub async fn send_message(
        &self,
        channel_id: &str,
        content: &str,
        reply_to: Option<&str>,
    ) -> Result<ChatMessage, ChatError> {
        let request = SendMessageRequest {
            content: content.to_string(),
            reply_to: reply_to.map(String::from),
        };

        let response = self
            .client
            .post(self.channel_url(channel_id))
            .header("Authorization", self.auth_header())
            .json(&request)
            .send()
            .await?;

        let message: ChatMessage = self.handle_response(response).await?;
        debug!(message_id = %message.id, "Sent message to channel {}", channel_id);
        Ok(message)
    }

    /// Reply in the channel of `original`, threaded to it.
    pub async fn reply(&self, original: &ChatMessage, content: &str) -> Result<ChatMessage, ChatError> {
        self.send_message(&original.channel_id, content, Some(&original.id))
            .await
    }

    /// Fetch one message by id.
    #[instrument(skip(self))]
    pub async fn get_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<ChatMessage, ChatError> {
        let response = self
            .client
            .get(format!("{}/{}", self.channel_url(channel_id), encode(message_id)))
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Most recent messages of a channel, newest first.
    #[instrument(skip(self))]
    pub async fn recent_messages(
        &self,
        channel_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.list_messages(channel_id, None, limit).await
    }

    /// Messages posted after `after`, newest first.
    #[instrument(skip(self))]
    pub async fn messages_after(
        &self,
        channel_id: &str,
        after: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.list_messages(channel_id, Some(after), limit).await
    }

    async fn list_messages(
        &self,
        channel_id: &str,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }

        let response = self
            .client
            .get(self.channel_url(channel_id))
            .header("Authorization", self.auth_header())
            .query(&query)
            .send()
            .await?;

        let messages: Vec<ChatMessage> = self.handle_response(response).await?;
        debug!("Fetched {} messages", messages.len());
        Ok(messages)
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T, ChatError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%status, "Chat gateway rejected bot token");
            return Err(ChatError::Unauthorized);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(%status, body = %message, "Chat gateway request failed");
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
