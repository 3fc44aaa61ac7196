//! Auth bridge - confirms dashboard logins through a chat channel.
//!
//! The dashboard asks the bridge to start a login for a chat member. The
//! bridge posts a prompt mentioning that member, the member answers yes in
//! the channel, and the dashboard polls until the login is verified or the
//! request expires.

pub mod api;
pub mod config;
pub mod error;
pub mod listener;
pub mod outbox;

pub use config::Config;
pub use error::{ApiError, AppError, AppResult};
pub use listener::ConfirmationListener;
pub use outbox::ChatConfirmationSender;
