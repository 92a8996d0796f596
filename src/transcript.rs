//! Transcript view-model.
//!
//! The transcript is the ordered list of chat entries shown to the user. It
//! only ever grows by appending, except that the text of the final entry may
//! be replaced while a bot response is streaming in.

use serde::{Deserialize, Serialize};

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the local user.
    User,
    /// Streamed back by the backend.
    Bot,
}

impl Sender {
    /// Lowercase tag handed to bubble renderers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// One displayed chat entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Entry author.
    pub sender: Sender,
    /// Entry text.
    pub text: String,
}

impl TranscriptEntry {
    /// A user entry carrying the raw input text.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    /// An empty bot entry awaiting streamed text.
    #[must_use]
    pub fn bot_placeholder() -> Self {
        Self {
            sender: Sender::Bot,
            text: String::new(),
        }
    }

    /// Copy of this entry with its text replaced.
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            sender: self.sender,
            text: text.into(),
        }
    }

    /// True for an empty bot entry.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.sender == Sender::Bot && self.text.is_empty()
    }
}

/// Ordered sequence of transcript entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Replace the last entry with `last.with_text(text)` when it is a bot entry.
    ///
    /// Returns `false` and leaves the transcript untouched when it is empty or
    /// ends with a user entry.
    pub fn replace_last_bot_text(&mut self, text: &str) -> bool {
        match self.entries.last() {
            Some(last) if last.sender == Sender::Bot => {
                let replacement = last.with_text(text);
                let tail = self.entries.len() - 1;
                self.entries.truncate(tail);
                self.entries.push(replacement);
                true
            }
            _ => false,
        }
    }

    /// All entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// The newest entry, if any.
    #[must_use]
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_last_bot_text() {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptEntry::user("Hi"));
        transcript.push(TranscriptEntry::bot_placeholder());

        assert!(transcript.replace_last_bot_text("Hel"));
        assert!(transcript.replace_last_bot_text("Hello!"));

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.entries()[0], TranscriptEntry::user("Hi"));
        assert_eq!(transcript.last().unwrap().text, "Hello!");
        assert_eq!(transcript.last().unwrap().sender, Sender::Bot);
    }

    #[test]
    fn test_replace_dropped_without_bot_tail() {
        let mut transcript = Transcript::new();
        assert!(!transcript.replace_last_bot_text("ignored"));
        assert!(transcript.is_empty());

        transcript.push(TranscriptEntry::user("Hi"));
        assert!(!transcript.replace_last_bot_text("ignored"));
        assert_eq!(transcript.entries(), &[TranscriptEntry::user("Hi")]);
    }

    #[test]
    fn test_sender_serialization() {
        let json = serde_json::to_string(&TranscriptEntry::bot_placeholder()).unwrap();
        assert_eq!(json, r#"{"sender":"bot","text":""}"#);
        assert!(TranscriptEntry::bot_placeholder().is_placeholder());
        assert!(!TranscriptEntry::user("").is_placeholder());
    }
}
