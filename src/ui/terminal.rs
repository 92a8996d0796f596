//! Line-oriented terminal surface.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::Mutex;
use tracing::warn;

use super::bubble::{bubble_prefix, render_bubble};
use crate::widget::{ChatState, Surface};

/// Line reader shared between the command loop and the surface's prompt.
pub type SharedLines<R> = Arc<Mutex<Lines<R>>>;

/// Prints the transcript incrementally to a terminal.
///
/// New entries start a new bubble; growth of the streaming entry is written
/// as a suffix so fragments appear as they arrive.
#[derive(Debug)]
pub struct TerminalSurface<W, R> {
    out: W,
    input: SharedLines<R>,
    printed_entries: usize,
    printed_text: String,
}

impl<W, R> TerminalSurface<W, R>
where
    W: Write + Send,
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(out: W, input: SharedLines<R>) -> Self {
        Self {
            out,
            input,
            printed_entries: 0,
            printed_text: String::new(),
        }
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()) {
            warn!(name: "ui.terminal.write_failed", error = %e, "Terminal write failed");
        }
    }
}

#[async_trait]
impl<W, R> Surface for TerminalSurface<W, R>
where
    W: Write + Send,
    R: AsyncBufRead + Unpin + Send,
{
    fn render(&mut self, state: &ChatState) {
        let entries = state.transcript().entries();

        if let Some(open) = self
            .printed_entries
            .checked_sub(1)
            .and_then(|idx| entries.get(idx))
        {
            match open.text.strip_prefix(self.printed_text.as_str()) {
                Some("") => {}
                Some(suffix) => {
                    let suffix = suffix.to_string();
                    self.write(&suffix);
                }
                None => {
                    let line = format!("\n{}", render_bubble(open));
                    self.write(&line);
                }
            }
            self.printed_text.clone_from(&open.text);
        }

        for entry in entries.iter().skip(self.printed_entries) {
            let line = format!("\n{}{}", bubble_prefix(entry.sender), entry.text);
            self.write(&line);
            self.printed_text.clone_from(&entry.text);
        }
        self.printed_entries = entries.len();
    }

    fn scroll_to_latest(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!(name: "ui.terminal.flush_failed", error = %e, "Terminal flush failed");
        }
    }

    async fn prompt(&mut self, message: &str) -> Option<String> {
        let question = format!("\n{message} ");
        self.write(&question);
        self.scroll_to_latest();
        self.input.lock().await.next_line().await.ok().flatten()
    }

    fn alert(&mut self, message: &str) {
        let line = format!("\n[!] {message}");
        self.write(&line);
        self.scroll_to_latest();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionToken;
    use tokio::io::AsyncBufReadExt;

    fn surface(input: &'static [u8]) -> TerminalSurface<Vec<u8>, &'static [u8]> {
        TerminalSurface::new(Vec::new(), Arc::new(Mutex::new(input.lines())))
    }

    fn output(surface: &TerminalSurface<Vec<u8>, &'static [u8]>) -> String {
        String::from_utf8(surface.out.clone()).unwrap()
    }

    #[test]
    fn test_streaming_entry_printed_as_suffixes() {
        let mut surface = surface(b"");
        let mut state = ChatState::new(SessionToken::from_string("1"));

        state.set_input("Hi");
        state.begin_turn().unwrap();
        surface.render(&state);
        state.push_fragment("Hel");
        surface.render(&state);
        state.push_fragment("lo!");
        surface.render(&state);
        surface.render(&state);

        assert_eq!(output(&surface), "\nyou> Hi\nkrypto> Hello!");
    }

    #[tokio::test]
    async fn test_prompt_reads_next_line() {
        let mut surface = surface(b"me@example.com\n");
        let answer = surface.prompt("Email?").await;
        assert_eq!(answer.as_deref(), Some("me@example.com"));
        assert_eq!(surface.prompt("Again?").await, None);
        assert!(output(&surface).contains("Email? "));
    }
}
