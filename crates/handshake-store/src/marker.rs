//! Token marker embedded in confirmation prompts.
//!
//! Prompts carry the token as a bracketed tag (`[3f9a...]`) so that a
//! confirmation can still be matched when the chat platform gives us no
//! reply threading. Scanning is a heuristic: any bracketed alphanumeric run
//! of at least [`MIN_TAG_LEN`] characters is accepted.

use regex::Regex;
use std::sync::LazyLock;

/// Shortest bracketed run treated as a token.
pub const MIN_TAG_LEN: usize = 8;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\[([a-z0-9]{{{},}})\]", MIN_TAG_LEN)).expect("valid tag pattern")
});

/// Render the bracketed tag for a token.
pub fn token_tag(token: &str) -> String {
    format!("[{}]", token)
}

/// Recover the first token tag from a message body.
pub fn extract_token(text: &str) -> Option<String> {
    TAG.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Render a user mention.
pub fn mention(user_id: &str) -> String {
    format!("<@{}>", user_id)
}

/// Whether `text` mentions `user_id`.
pub fn mentions(text: &str, user_id: &str) -> bool {
    text.contains(&mention(user_id))
}
