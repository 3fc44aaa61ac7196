//! Outbound side of the handshake.

use crate::error::SendError;
use crate::types::PromptRequest;
use async_trait::async_trait;

/// Posts confirmation prompts to the out-of-band channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmationSender: Send + Sync {
    /// Post the prompt and return the platform id of the posted message.
    ///
    /// The rendered text must contain [`token_tag`](crate::token_tag) for the
    /// request's token and a [`mention`](crate::mention) of the owner.
    async fn send_confirmation(&self, prompt: &PromptRequest) -> Result<String, SendError>;
}
