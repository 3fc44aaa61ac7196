//! Out-of-band login handshakes.
//!
//! A login attempt issues a one-time token and posts a confirmation prompt to
//! a chat channel. The attempt becomes verified when its owner answers the
//! prompt, and expires a fixed time after creation. All state lives in
//! memory; a restart drops every pending attempt.

mod error;
mod marker;
mod sender;
mod store;
mod types;

pub use error::{HandshakeError, SendError};
pub use marker::{extract_token, mention, mentions, token_tag, MIN_TAG_LEN};
pub use sender::ConfirmationSender;
pub use store::{HandshakeStore, DEFAULT_TTL};
pub use types::*;
