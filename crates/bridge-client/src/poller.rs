//! Client-side polling for a pending login.
//!
//! The poller gives up on its own after as many attempts as fit in the
//! validity window, so an unreachable bridge cannot keep it alive.

use crate::client::BridgeClient;
use crate::error::BridgeError;
use async_trait::async_trait;
use handshake_store::HandshakeStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Anything that can report the status of a handshake token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn status(&self, token: &str) -> Result<HandshakeStatus, BridgeError>;
}

#[async_trait]
impl StatusSource for BridgeClient {
    async fn status(&self, token: &str) -> Result<HandshakeStatus, BridgeError> {
        self.check(token).await
    }
}

/// How a polling run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Verified { owner_name: Option<String> },
    Expired,
    /// Ran out of attempts without a terminal answer.
    Exhausted,
    Cancelled,
}

/// Polls a token until it is verified or expired.
#[derive(Debug, Clone)]
pub struct HandshakePoller {
    interval: Duration,
    max_attempts: u32,
}

impl HandshakePoller {
    /// Poller for a handshake valid for `ttl`, polling every `interval`.
    pub fn new(interval: Duration, ttl: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let step = interval.as_millis();
        let attempts = ttl.as_millis().div_ceil(step).max(1);

        Self {
            interval,
            max_attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Poll in a background task.
    pub fn spawn<S>(&self, source: Arc<S>, token: impl Into<String>) -> PollHandle
    where
        S: StatusSource + ?Sized + 'static,
    {
        let (cancel, cancelled) = watch::channel(false);
        let poller = self.clone();
        let token = token.into();

        let task = tokio::spawn(async move { poller.run(source.as_ref(), &token, cancelled).await });

        PollHandle { cancel, task }
    }

    /// Poll until a terminal status, exhaustion, or cancellation.
    ///
    /// Cancellation is signalled by `true` on the watch channel or by
    /// dropping its sender.
    pub async fn run<S>(
        &self,
        source: &S,
        token: &str,
        mut cancelled: watch::Receiver<bool>,
    ) -> PollOutcome
    where
        S: StatusSource + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let poll = async {
                sleep(self.interval).await;
                source.status(token).await
            };

            let result = tokio::select! {
                biased;
                _ = cancelled.wait_for(|c| *c) => {
                    debug!(attempt, "Login polling cancelled");
                    return PollOutcome::Cancelled;
                }
                result = poll => result,
            };

            match result {
                Ok(status) if status.verified => {
                    info!(attempt, "Login verified");
                    return PollOutcome::Verified {
                        owner_name: status.owner_name,
                    };
                }
                Ok(status) if status.expired => {
                    info!(attempt, "Login expired");
                    return PollOutcome::Expired;
                }
                Ok(_) => debug!(attempt, "Login still pending"),
                Err(e) => warn!(attempt, error = %e, "Login status poll failed"),
            }
        }

        warn!(attempts = self.max_attempts, "Login polling gave up");
        PollOutcome::Exhausted
    }
}

impl Default for HandshakePoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, handshake_store::DEFAULT_TTL)
    }
}

/// A running poll task.
pub struct PollHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    /// Stop polling. No server-side cleanup is needed.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Wait for the task to finish.
    pub async fn outcome(self) -> PollOutcome {
        let PollHandle { cancel, task } = self;
        let outcome = task.await.unwrap_or(PollOutcome::Cancelled);
        drop(cancel);
        outcome
    }
}
