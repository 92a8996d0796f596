//! Message bubble rendering.

use crate::transcript::{Sender, TranscriptEntry};

/// Placeholder shown next to the input prompt.
pub const INPUT_PLACEHOLDER: &str = "Ask Krypto...";

/// Display label for a sender.
#[must_use]
pub fn label(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "you",
        Sender::Bot => "krypto",
    }
}

/// Opening of a bubble: the sender label and separator.
#[must_use]
pub fn bubble_prefix(sender: Sender) -> String {
    format!("{}> ", label(sender))
}

/// A complete single-entry bubble.
#[must_use]
pub fn render_bubble(entry: &TranscriptEntry) -> String {
    format!("{}{}", bubble_prefix(entry.sender), entry.text)
}
