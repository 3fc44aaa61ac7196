//! Channel receiver with polling.

use crate::client::ChatClient;
use crate::types::*;
use std::time::Duration;
use tokio::time::sleep;
use tokio_stream::Stream;
use tracing::{debug, error};

/// Receiver that polls a channel for new messages.
pub struct MessageReceiver {
    client: ChatClient,
    channel_id: String,
    poll_interval: Duration,
    batch_limit: usize,
}

impl MessageReceiver {
    /// Create a new message receiver.
    pub fn new(client: ChatClient, channel_id: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            client,
            channel_id: channel_id.into(),
            poll_interval,
            batch_limit: 50,
        }
    }

    /// Start receiving messages as an async stream, oldest first.
    ///
    /// Messages already in the channel when the stream starts are skipped.
    pub fn stream(self) -> impl Stream<Item = ChatMessage> {
        async_stream::stream! {
            let mut cursor: Option<String> = loop {
                match self.client.recent_messages(&self.channel_id, 1).await {
                    Ok(latest) => break latest.into_iter().next().map(|m| m.id),
                    Err(e) => {
                        error!("Failed to read channel cursor: {}", e);
                        sleep(Duration::from_secs(5)).await;
                    }
                }
            };

            loop {
                let batch = match cursor.as_deref() {
                    Some(after) => {
                        self.client
                            .messages_after(&self.channel_id, after, self.batch_limit)
                            .await
                    }
                    None => {
                        self.client
                            .recent_messages(&self.channel_id, self.batch_limit)
                            .await
                    }
                };

                match batch {
                    Ok(messages) => {
                        if let Some(newest) = messages.first() {
                            cursor = Some(newest.id.clone());
                        }
                        for msg in messages.into_iter().rev() {
                            debug!("Received: {} from {}", msg.preview(), msg.author.username);
                            yield msg;
                        }
                    }
                    Err(e) => {
                        error!("Receive error: {}", e);
                        // Back off on error
                        sleep(Duration::from_secs(5)).await;
                        continue;
                    }
                }

                sleep(self.poll_interval).await;
            }
        }
    }
}
