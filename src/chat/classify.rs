//! Text-versus-link classification of submitted drafts.

use regex::Regex;
use std::sync::LazyLock;

use super::clock::Clock;
use super::message::ChatMessage;

/// `http://` or `https://` followed by at least one non-whitespace char.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// True when `raw` has nothing but whitespace. Such drafts are never submitted.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Tag a non-blank submission as a link or plain text.
///
/// One match anywhere makes the whole string a link. The stored content is
/// always the full original text, untrimmed.
pub fn classify(raw: &str, clock: &dyn Clock, timestamp_format: &str) -> ChatMessage {
    let timestamp = clock.timestamp(timestamp_format);
    if LINK_RE.is_match(raw) {
        ChatMessage::link(raw, timestamp)
    } else {
        ChatMessage::text(raw, timestamp)
    }
}

/// First URL inside a link message's text.
pub fn first_url(text: &str) -> Option<&str> {
    LINK_RE.find(text).map(|m| m.as_str())
}
