//! In-memory handshake table with lazy expiry.

use crate::error::HandshakeError;
use crate::sender::ConfirmationSender;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Default validity window of a login attempt.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Default)]
struct Table {
    entries: HashMap<String, PendingAuth>,
    /// Tokens handed out to creates whose prompt is still being sent.
    reserved: HashMap<String, Instant>,
}

impl Table {
    fn is_taken(&self, token: &str) -> bool {
        self.entries.contains_key(token) || self.reserved.contains_key(token)
    }

    /// Correlation id first, then the recovered token.
    fn resolve(&self, hint: &CorrelationHint) -> Option<String> {
        if let Some(message_id) = hint.message_id.as_deref() {
            if let Some(entry) = self
                .entries
                .values()
                .find(|e| e.correlation_message_id == message_id)
            {
                return Some(entry.token.clone());
            }
        }

        hint.token
            .as_deref()
            .filter(|token| self.entries.contains_key(*token))
            .map(String::from)
    }
}

/// Shared table of pending login attempts.
///
/// Cloning is cheap; all clones see the same table. Every mutation happens
/// under the write lock, and no lock is held while a prompt is being sent.
#[derive(Clone)]
pub struct HandshakeStore {
    table: Arc<RwLock<Table>>,
    sender: Arc<dyn ConfirmationSender>,
    ttl: Duration,
}

impl HandshakeStore {
    pub fn new(sender: Arc<dyn ConfirmationSender>, ttl: Duration) -> Self {
        info!("Handshake store initialized (ttl={:?})", ttl);

        Self {
            table: Arc::new(RwLock::new(Table::default())),
            sender,
            ttl,
        }
    }

    /// Start a login attempt for `owner_id` and post its confirmation prompt.
    ///
    /// Nothing is stored unless the prompt was posted.
    #[instrument(skip(self, owner_name, client_hint))]
    pub async fn create(
        &self,
        owner_id: &str,
        owner_name: &str,
        client_hint: Option<&str>,
    ) -> Result<Issued, HandshakeError> {
        if owner_id.trim().is_empty() {
            return Err(HandshakeError::Validation("owner_id is required".into()));
        }
        if owner_name.trim().is_empty() {
            return Err(HandshakeError::Validation("owner_name is required".into()));
        }

        // The window runs from the request, not from when the prompt landed.
        let requested_at = Instant::now();
        let token = self.reserve_token().await;
        let prompt = PromptRequest {
            token: token.clone(),
            owner_id: owner_id.to_string(),
            owner_name: owner_name.to_string(),
            client_hint: client_hint.map(String::from),
            ttl: self.ttl,
        };

        let sent = self.sender.send_confirmation(&prompt).await;

        let mut table = self.table.write().await;
        table.reserved.remove(&token);

        let correlation_message_id = match sent {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Confirmation prompt could not be sent");
                return Err(HandshakeError::UpstreamSend(e.to_string()));
            }
        };

        let mut entry = PendingAuth::new(&token, owner_id, owner_name, &correlation_message_id);
        entry.created_at = requested_at;

        info!(
            owner_name = %owner_name,
            message_id = %correlation_message_id,
            issued_at = %entry.issued_at.to_rfc3339(),
            "Login confirmation requested"
        );

        table.entries.insert(token.clone(), entry);

        Ok(Issued {
            token,
            correlation_message_id,
        })
    }

    async fn reserve_token(&self) -> String {
        let mut table = self.table.write().await;
        loop {
            let token = generate_token();
            if !table.is_taken(&token) {
                table.reserved.insert(token.clone(), Instant::now());
                return token;
            }
        }
    }

    /// Apply a confirmation from `confirming_user_id`.
    ///
    /// Returns true when the resolved attempt is (now) verified.
    pub async fn confirm(&self, confirming_user_id: &str, hint: &CorrelationHint) -> bool {
        self.resolve_confirmation(confirming_user_id, hint)
            .await
            .accepted()
    }

    /// Apply a confirmation and report how it was resolved.
    #[instrument(skip(self))]
    pub async fn resolve_confirmation(
        &self,
        confirming_user_id: &str,
        hint: &CorrelationHint,
    ) -> ConfirmOutcome {
        let now = Instant::now();
        let mut table = self.table.write().await;

        let Some(token) = table.resolve(hint) else {
            debug!("Confirmation does not match any pending login");
            return ConfirmOutcome::Unknown;
        };

        let Some(entry) = table.entries.get_mut(&token) else {
            return ConfirmOutcome::Unknown;
        };

        if entry.is_expired_at(now, self.ttl) {
            table.entries.remove(&token);
            info!("Confirmation arrived after the login expired");
            return ConfirmOutcome::Unknown;
        }

        if entry.owner_id != confirming_user_id {
            warn!(
                expected = %entry.owner_id,
                received = %confirming_user_id,
                "Confirmation from a different user ignored"
            );
            return ConfirmOutcome::IdentityMismatch;
        }

        if entry.verified {
            debug!(owner_name = %entry.owner_name, "Login already confirmed");
            return ConfirmOutcome::AlreadyConfirmed {
                owner_name: entry.owner_name.clone(),
            };
        }

        entry.verified = true;
        info!(owner_name = %entry.owner_name, "Login confirmed");

        ConfirmOutcome::Confirmed {
            owner_name: entry.owner_name.clone(),
        }
    }

    /// Poll the state of a login attempt.
    ///
    /// Unknown and expired tokens look the same. Polling never extends the
    /// validity window.
    pub async fn check(&self, token: &str) -> HandshakeStatus {
        let now = Instant::now();

        {
            let table = self.table.read().await;
            match table.entries.get(token) {
                None => return HandshakeStatus::expired(),
                Some(entry) if !entry.is_expired_at(now, self.ttl) => {
                    return HandshakeStatus::live(entry);
                }
                Some(_) => {}
            }
        }

        let mut table = self.table.write().await;
        if let Some(entry) = table.entries.get(token) {
            if !entry.is_expired_at(now, self.ttl) {
                return HandshakeStatus::live(entry);
            }
            table.entries.remove(token);
            info!("Login request expired");
        }

        HandshakeStatus::expired()
    }

    /// Drop every expired attempt. Returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let mut table = self.table.write().await;
        let before = table.entries.len();

        table.entries.retain(|_, entry| !entry.is_expired_at(now, ttl));
        // A create dropped mid-send leaves its reservation behind.
        table
            .reserved
            .retain(|_, at| now.saturating_duration_since(*at) <= ttl);

        before - table.entries.len()
    }

    /// Spawn a background task that sweeps expired attempts every `interval`.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let removed = store.sweep_expired().await;
                if removed > 0 {
                    debug!("Swept {} expired login requests", removed);
                }
            }
        })
    }

    /// Number of attempts still inside their validity window.
    pub async fn pending_count(&self) -> usize {
        let now = Instant::now();
        let table = self.table.read().await;
        table
            .entries
            .values()
            .filter(|entry| !entry.is_expired_at(now, self.ttl))
            .count()
    }

    /// Drop all attempts, live or not.
    pub async fn clear(&self) -> usize {
        let mut table = self.table.write().await;
        let removed = table.entries.len();
        table.entries.clear();
        table.reserved.clear();

        if removed > 0 {
            info!("Discarded {} pending login requests", removed);
        }

        removed
    }
}

/// 128 random bits, lowercase hex.
fn generate_token() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}
