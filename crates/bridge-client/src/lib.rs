//! Client for the auth bridge REST API.
//!
//! Requests a login for a chat member and polls its handshake until the
//! member confirms in chat, the handshake expires, or the caller gives up.

mod client;
mod error;
mod poller;

pub use client::BridgeClient;
pub use error::BridgeError;
pub use handshake_store::HandshakeStatus;
pub use poller::{HandshakePoller, PollHandle, PollOutcome, StatusSource, DEFAULT_POLL_INTERVAL};
