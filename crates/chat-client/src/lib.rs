//! Chat platform REST gateway client.

mod client;
mod error;
mod receiver;
mod types;

pub use client::ChatClient;
pub use error::ChatError;
pub use receiver::MessageReceiver;
pub use types::*;
