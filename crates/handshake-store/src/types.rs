//! Handshake records and results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Lifecycle state of a login attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HandshakeState {
    /// Prompt sent, waiting for the owner to confirm
    Pending,
    /// Confirmed by the owner in the chat channel
    Verified,
    /// Validity window elapsed
    Expired,
}

/// One outstanding login attempt.
#[derive(Debug, Clone)]
pub struct PendingAuth {
    pub token: String,
    pub owner_id: String,
    pub owner_name: String,
    /// Platform id of the prompt message posted for this attempt.
    pub correlation_message_id: String,
    /// Wall-clock issue time, informational.
    pub issued_at: DateTime<Utc>,
    /// Monotonic creation time; the expiry horizon is measured from here.
    pub created_at: Instant,
    pub verified: bool,
}

impl PendingAuth {
    pub fn new(
        token: impl Into<String>,
        owner_id: impl Into<String>,
        owner_name: impl Into<String>,
        correlation_message_id: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            owner_id: owner_id.into(),
            owner_name: owner_name.into(),
            correlation_message_id: correlation_message_id.into(),
            issued_at: Utc::now(),
            created_at: Instant::now(),
            verified: false,
        }
    }

    /// Whether more than `ttl` has passed since creation.
    pub fn is_expired_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }

    pub fn state_at(&self, now: Instant, ttl: Duration) -> HandshakeState {
        if self.is_expired_at(now, ttl) {
            HandshakeState::Expired
        } else if self.verified {
            HandshakeState::Verified
        } else {
            HandshakeState::Pending
        }
    }
}

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issued {
    pub token: String,
    pub correlation_message_id: String,
}

/// What the poller sees for a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeStatus {
    pub verified: bool,
    pub expired: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
}

impl HandshakeStatus {
    /// Status for unknown and expired tokens alike.
    pub fn expired() -> Self {
        Self {
            verified: false,
            expired: true,
            owner_name: None,
        }
    }

    pub(crate) fn live(entry: &PendingAuth) -> Self {
        Self {
            verified: entry.verified,
            expired: false,
            owner_name: Some(entry.owner_name.clone()),
        }
    }
}

/// Clues an inbound message offers about which attempt it confirms.
///
/// `message_id` is the id of the prompt the user replied to, when the platform
/// threads replies. `token` is a token recovered by scanning prompt text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationHint {
    pub message_id: Option<String>,
    pub token: Option<String>,
}

impl CorrelationHint {
    /// Hint from a threaded reply, with the replied-to prompt text if it was fetched.
    pub fn from_reply(message_id: impl Into<String>, prompt_text: Option<&str>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            token: prompt_text.and_then(crate::marker::extract_token),
        }
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            message_id: None,
            token: Some(token.into()),
        }
    }

    /// Hint from scanning prompt text for a token tag.
    pub fn from_text(text: &str) -> Self {
        Self {
            message_id: None,
            token: crate::marker::extract_token(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.message_id.is_none() && self.token.is_none()
    }
}

/// How a confirmation attempt was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The attempt moved from pending to verified.
    Confirmed { owner_name: String },
    /// The attempt was already verified by the same owner.
    AlreadyConfirmed { owner_name: String },
    /// The attempt exists but belongs to someone else.
    IdentityMismatch,
    /// No live attempt matches the hint.
    Unknown,
}

impl ConfirmOutcome {
    pub fn accepted(&self) -> bool {
        matches!(
            self,
            ConfirmOutcome::Confirmed { .. } | ConfirmOutcome::AlreadyConfirmed { .. }
        )
    }
}

/// Everything a sender needs to render a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub token: String,
    pub owner_id: String,
    pub owner_name: String,
    /// Free-form hint about where the login came from (e.g. client address).
    pub client_hint: Option<String>,
    pub ttl: Duration,
}
