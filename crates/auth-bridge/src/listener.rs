//! Turns affirmative chat messages into handshake confirmations.

use chat_client::{ChatClient, ChatMessage};
use handshake_store::{mentions, ConfirmOutcome, CorrelationHint, HandshakeStore};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

const CONFIRMED_REPLY: &str = "✅ Login confirmed! You can go back to the dashboard.";
const EXPIRED_REPLY: &str = "⌛ That login request has expired. Request a new one from the dashboard.";

/// Watches the prompt channel and confirms pending logins.
pub struct ConfirmationListener {
    store: HandshakeStore,
    chat: ChatClient,
    channel_id: String,
    affirmative: Vec<String>,
    history_limit: usize,
}

impl ConfirmationListener {
    pub fn new(
        store: HandshakeStore,
        chat: ChatClient,
        channel_id: impl Into<String>,
        affirmative: Vec<String>,
    ) -> Self {
        Self {
            store,
            chat,
            channel_id: channel_id.into(),
            affirmative: affirmative.into_iter().map(|w| w.to_lowercase()).collect(),
            history_limit: 50,
        }
    }

    /// Number of recent messages searched for a prompt when the
    /// confirmation is not a threaded reply.
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit.max(1);
        self
    }

    /// Whether `message` is a human answering yes in the prompt channel.
    pub fn is_confirmation(&self, message: &ChatMessage) -> bool {
        if message.author.bot || message.channel_id != self.channel_id {
            return false;
        }

        let text = message.content.trim().to_lowercase();
        self.affirmative.iter().any(|word| *word == text)
    }

    /// Process one inbound message.
    ///
    /// Returns how the confirmation was resolved, or `None` when the message
    /// was not a confirmation or no prompt could be associated with it.
    pub async fn handle(&self, message: &ChatMessage) -> Option<ConfirmOutcome> {
        if !self.is_confirmation(message) {
            return None;
        }

        match message.reply_to.as_deref() {
            Some(prompt_id) => self.handle_reply(message, prompt_id).await,
            None => self.handle_unthreaded(message).await,
        }
    }

    async fn handle_reply(&self, message: &ChatMessage, prompt_id: &str) -> Option<ConfirmOutcome> {
        let hint = match self.chat.get_message(&self.channel_id, prompt_id).await {
            Ok(prompt) if prompt.author.bot => {
                CorrelationHint::from_reply(prompt_id, Some(prompt.content.as_str()))
            }
            Ok(_) => {
                debug!("Affirmative reply to a non-bot message ignored");
                return None;
            }
            Err(e) => {
                // Prompt ids only ever belong to our own messages.
                warn!(error = %e, "Could not fetch replied-to message");
                CorrelationHint::from_reply(prompt_id, None)
            }
        };

        let outcome = self
            .store
            .resolve_confirmation(&message.author.id, &hint)
            .await;

        if let ConfirmOutcome::Confirmed { .. } = outcome {
            self.reply(message, CONFIRMED_REPLY).await;
        }

        Some(outcome)
    }

    async fn handle_unthreaded(&self, message: &ChatMessage) -> Option<ConfirmOutcome> {
        let history = match self
            .chat
            .recent_messages(&self.channel_id, self.history_limit)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                error!("Failed to read channel history: {}", e);
                return None;
            }
        };

        // History is newest first.
        let prompt = history
            .iter()
            .find(|m| m.author.bot && mentions(&m.content, &message.author.id))?;

        let hint = CorrelationHint::from_text(&prompt.content);
        if hint.is_empty() {
            debug!(prompt_id = %prompt.id, "Prompt carries no token");
            return None;
        }

        let outcome = self
            .store
            .resolve_confirmation(&message.author.id, &hint)
            .await;

        match &outcome {
            ConfirmOutcome::Confirmed { .. } => self.reply(message, CONFIRMED_REPLY).await,
            ConfirmOutcome::Unknown => self.reply(message, EXPIRED_REPLY).await,
            _ => {}
        }

        Some(outcome)
    }

    async fn reply(&self, message: &ChatMessage, text: &str) {
        if let Err(e) = self.chat.reply(message, text).await {
            error!("Failed to send reply: {}", e);
        }
    }

    /// Handle messages until the stream ends.
    pub async fn run<S>(&self, stream: S)
    where
        S: Stream<Item = ChatMessage>,
    {
        info!(channel_id = %self.channel_id, "Listening for login confirmations");
        tokio::pin!(stream);

        while let Some(message) = stream.next().await {
            if let Some(outcome) = self.handle(&message).await {
                debug!(?outcome, "Confirmation handled");
            }
        }

        warn!("Inbound message stream ended");
    }
}
