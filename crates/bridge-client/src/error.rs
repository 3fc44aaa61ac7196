//! Bridge client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bridge rejected request: {code} - {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },
}
