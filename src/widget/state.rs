//! Widget view-model.

use serde::Serialize;

use crate::channel::UserMessage;
use crate::session::SessionToken;
use crate::transcript::{Transcript, TranscriptEntry};

/// Everything the widget displays, owned by a single widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatState {
    session: SessionToken,
    transcript: Transcript,
    /// Concatenation of every fragment received for the in-flight response.
    accumulator: String,
    input: String,
}

impl ChatState {
    /// Fresh state for a newly mounted widget.
    #[must_use]
    pub fn new(session: SessionToken) -> Self {
        Self {
            session,
            transcript: Transcript::new(),
            accumulator: String::new(),
            input: String::new(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn accumulator(&self) -> &str {
        &self.accumulator
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the contents of the input field.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Start a user turn from the current input.
    ///
    /// Appends the raw input as a user entry followed by one empty bot entry
    /// and resets the accumulator. Returns the message to send, or `None`
    /// without touching anything when the input is blank.
    pub fn begin_turn(&mut self) -> Option<UserMessage> {
        if self.input.trim().is_empty() {
            return None;
        }
        self.transcript.push(TranscriptEntry::user(self.input.clone()));
        self.transcript.push(TranscriptEntry::bot_placeholder());
        self.accumulator.clear();

        Some(UserMessage {
            session_id: self.session.clone(),
            message: self.input.clone(),
        })
    }

    /// Append a streamed fragment and mirror the accumulator into the last
    /// transcript entry.
    ///
    /// Returns `true` when the transcript changed. Empty fragments leave the
    /// accumulator as is; a transcript that does not end with a bot entry
    /// drops the update.
    pub fn push_fragment(&mut self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return false;
        }
        self.accumulator.push_str(fragment);
        self.transcript.replace_last_bot_text(&self.accumulator)
    }
}
