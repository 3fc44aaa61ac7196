//! Posts login prompts to the chat channel.

use async_trait::async_trait;
use chat_client::ChatClient;
use handshake_store::{mention, token_tag, ConfirmationSender, PromptRequest, SendError};
use tracing::debug;

/// [`ConfirmationSender`] backed by the chat gateway.
pub struct ChatConfirmationSender {
    client: ChatClient,
    channel_id: String,
}

impl ChatConfirmationSender {
    pub fn new(client: ChatClient, channel_id: impl Into<String>) -> Self {
        Self {
            client,
            channel_id: channel_id.into(),
        }
    }
}

#[async_trait]
impl ConfirmationSender for ChatConfirmationSender {
    async fn send_confirmation(&self, prompt: &PromptRequest) -> Result<String, SendError> {
        let content = render_prompt(prompt);

        let sent = self
            .client
            .send_message(&self.channel_id, &content, None)
            .await
            .map_err(|e| SendError::new(e.to_string()))?;

        debug!(message_id = %sent.id, "Login prompt posted");
        Ok(sent.id)
    }
}

/// Text of a login prompt. Always carries the owner mention and token tag.
pub fn render_prompt(prompt: &PromptRequest) -> String {
    let mut text = format!(
        "🔐 **Dashboard login**\n\n{} ({}), someone is trying to log in to the dashboard as you.",
        mention(&prompt.owner_id),
        prompt.owner_name
    );

    if let Some(hint) = prompt.client_hint.as_deref().filter(|h| !h.is_empty()) {
        text.push_str(&format!("\nOrigin: `{}`", hint));
    }

    let minutes = prompt.ttl.as_secs().div_ceil(60).max(1);
    text.push_str(&format!(
        "\n\nReply **yes** to this message to confirm.\n⏰ This request expires in {} minute{}.\n\n{}",
        minutes,
        if minutes == 1 { "" } else { "s" },
        token_tag(&prompt.token)
    ));

    text
}
