//! Chat gateway types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

/// A message in a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub channel_id: String,
    pub author: Author,
    #[serde(default)]
    pub content: String,
    /// Id of the message this one replies to, if threaded.
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    /// First characters of the content, for logs.
    pub fn preview(&self) -> &str {
        match self.content.char_indices().nth(50) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }
}

/// Outgoing message request.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}
