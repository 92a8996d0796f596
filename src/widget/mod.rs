//! The chat widget.
//!
//! A mounted widget is a single-threaded actor: every user action, every
//! realtime event and every completed auxiliary request is turned into a
//! [`Command`] on one mailbox and applied to the [`ChatState`] in order. No
//! two handlers ever touch the state at the same time, and no locking is
//! needed around the transcript or the accumulator.
//!
//! # Example
//!
//! ```rust,ignore
//! let handle = ChatHandle::mount(transport, service, surface, sink, WidgetOptions::default());
//! handle.submit("Hi")?;
//! let state = handle.snapshot().await?;
//! assert_eq!(state.transcript().len(), 2);
//! let _final_state = handle.unmount().await?;
//! ```

pub mod state;
pub mod surface;

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::TranscriptService;
use crate::channel::{BotResponse, EventHandler, EventName, InboundEvent, OutboundEvent, Transport};
use crate::error::{Error, Result};
use crate::session::SessionToken;

pub use state::ChatState;
pub use surface::{FileSink, Surface};

/// Prompt shown when asking where to email the summary.
pub const EMAIL_PROMPT: &str = "Please enter your email to receive the summary:";
/// Alert shown when the email prompt is dismissed or left blank.
pub const EMAIL_REQUIRED_ALERT: &str = "Email is required to send the summary.";
/// Alert shown once the backend accepted a summary request.
pub const SUMMARY_SENT_ALERT: &str = "Summary has been sent to your email!";
/// Extension of downloaded transcripts unless configured otherwise.
pub const DEFAULT_DOWNLOAD_EXTENSION: &str = "pdf";

/// Name of the file a downloaded transcript is saved under.
#[must_use]
pub fn transcript_file_name(session: &SessionToken, extension: &str) -> String {
    format!("chat_session_{session}.{extension}")
}

/// Per-mount settings.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    /// Extension used for downloaded transcripts.
    pub download_extension: String,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            download_extension: DEFAULT_DOWNLOAD_EXTENSION.to_string(),
        }
    }
}

enum Command {
    SetInput(String),
    SendMessage,
    Inbound(InboundEvent),
    GenerateSummary(oneshot::Sender<()>),
    SummaryDelivered,
    DownloadChat,
    TranscriptReady(Bytes),
    Snapshot(oneshot::Sender<ChatState>),
    Unmount(oneshot::Sender<ChatState>),
}

/// Handle to a mounted widget.
///
/// The handle holds the only strong reference to the actor's mailbox.
/// Dropping it without calling [`ChatHandle::unmount`] lets the actor drain
/// pending commands, remove its subscriptions and stop.
#[derive(Debug)]
pub struct ChatHandle {
    session: SessionToken,
    mailbox: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl ChatHandle {
    /// Mount a widget with a freshly generated session token.
    pub fn mount<S, F>(
        transport: Arc<dyn Transport>,
        service: Arc<dyn TranscriptService>,
        surface: S,
        sink: F,
        options: WidgetOptions,
    ) -> Self
    where
        S: Surface + 'static,
        F: FileSink + 'static,
    {
        Self::mount_with_session(
            SessionToken::generate(),
            transport,
            service,
            surface,
            sink,
            options,
        )
    }

    /// Mount a widget under an existing session token.
    ///
    /// Installs one handler each for `connect`, `bot_response` and
    /// `disconnect` and spawns the actor on the current runtime.
    pub fn mount_with_session<S, F>(
        session: SessionToken,
        transport: Arc<dyn Transport>,
        service: Arc<dyn TranscriptService>,
        surface: S,
        sink: F,
        options: WidgetOptions,
    ) -> Self
    where
        S: Surface + 'static,
        F: FileSink + 'static,
    {
        let (mailbox, rx) = mpsc::unbounded_channel();

        for name in EventName::ALL {
            let forward = mailbox.downgrade();
            let handler: EventHandler = Arc::new(move |event| {
                // Once the handle is gone the upgrade fails and late events are dropped.
                if let Some(forward) = forward.upgrade() {
                    let _ = forward.send(Command::Inbound(event));
                }
            });
            transport.on(name, handler);
        }

        let actor = ChatActor {
            state: ChatState::new(session.clone()),
            transport,
            service,
            surface: Box::new(surface),
            sink: Arc::new(sink),
            options,
            mailbox: mailbox.downgrade(),
        };
        info!(name: "widget.mounted", session_id = %session, "Chat widget mounted");
        let task = tokio::spawn(actor.run(rx));

        Self {
            session,
            mailbox,
            task,
        }
    }

    /// Session token of this widget.
    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    fn post(&self, command: Command) -> Result<()> {
        self.mailbox.send(command).map_err(|_| Error::ChannelClosed)
    }

    /// Replace the contents of the input field.
    pub fn set_input(&self, text: impl Into<String>) -> Result<()> {
        self.post(Command::SetInput(text.into()))
    }

    /// Send the current input. Blank input is ignored.
    pub fn send_message(&self) -> Result<()> {
        self.post(Command::SendMessage)
    }

    /// Type `text` into the input field and send it.
    pub fn submit(&self, text: impl Into<String>) -> Result<()> {
        self.set_input(text)?;
        self.send_message()
    }

    /// Prompt for an email address and request a summary.
    ///
    /// Resolves once the prompt has been answered and the request (if any)
    /// dispatched; the outcome is reported through the surface.
    pub async fn generate_summary(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.post(Command::GenerateSummary(tx))?;
        rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Request the transcript download. The file is saved in the background.
    pub fn download_chat(&self) -> Result<()> {
        self.post(Command::DownloadChat)
    }

    /// Copy of the current state, after every previously posted command.
    pub async fn snapshot(&self) -> Result<ChatState> {
        let (tx, rx) = oneshot::channel();
        self.post(Command::Snapshot(tx))?;
        rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Remove the widget's subscriptions, stop the actor and return the final state.
    pub async fn unmount(self) -> Result<ChatState> {
        let (tx, rx) = oneshot::channel();
        self.post(Command::Unmount(tx))?;
        let state = rx.await.map_err(|_| Error::ChannelClosed)?;
        if let Err(e) = self.task.await {
            error!(name: "widget.join_failed", error = %e, "Widget task failed");
        }
        Ok(state)
    }
}

struct ChatActor {
    state: ChatState,
    transport: Arc<dyn Transport>,
    service: Arc<dyn TranscriptService>,
    surface: Box<dyn Surface>,
    sink: Arc<dyn FileSink>,
    options: WidgetOptions,
    mailbox: mpsc::WeakUnboundedSender<Command>,
}

impl ChatActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                Command::SetInput(text) => {
                    self.state.set_input(text);
                    self.surface.render(&self.state);
                }
                Command::SendMessage => self.send_message().await,
                Command::Inbound(event) => self.handle_inbound(event),
                Command::GenerateSummary(done) => {
                    self.generate_summary().await;
                    let _ = done.send(());
                }
                Command::SummaryDelivered => self.surface.alert(SUMMARY_SENT_ALERT),
                Command::DownloadChat => self.download_chat(),
                Command::TranscriptReady(contents) => self.save_transcript(contents).await,
                Command::Snapshot(reply) => {
                    let _ = reply.send(self.state.clone());
                }
                Command::Unmount(reply) => {
                    self.detach();
                    let _ = reply.send(self.state.clone());
                    return;
                }
            }
        }
        self.detach();
    }

    fn detach(&self) {
        for name in EventName::ALL {
            self.transport.off(name);
        }
        info!(
            name: "widget.unmounted",
            session_id = %self.state.session(),
            "Chat widget unmounted"
        );
    }

    /// Render, then scroll once rendering has completed.
    fn refresh(&mut self) {
        self.surface.render(&self.state);
        self.surface.scroll_to_latest();
    }

    async fn send_message(&mut self) {
        let Some(message) = self.state.begin_turn() else {
            return;
        };
        let session_id = message.session_id.clone();
        if let Err(e) = self.transport.emit(OutboundEvent::UserMessage(message)).await {
            error!(
                name: "widget.message.emit_failed",
                session_id = %session_id,
                error = %e,
                "Failed to send user message"
            );
        }
        self.state.clear_input();
        self.refresh();
    }

    fn handle_inbound(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Connect => {
                info!(name: "widget.channel.connected", "Connected to socket server");
            }
            InboundEvent::BotResponse(BotResponse { response }) => {
                debug!(
                    name: "widget.channel.fragment",
                    fragment = %response,
                    "Received bot response"
                );
                if self.state.push_fragment(&response) {
                    self.refresh();
                }
            }
            InboundEvent::Disconnect => {
                warn!(name: "widget.channel.disconnected", "Disconnected from socket server");
            }
        }
    }

    async fn generate_summary(&mut self) {
        let email = self
            .surface
            .prompt(EMAIL_PROMPT)
            .await
            .filter(|email| !email.trim().is_empty());
        let Some(email) = email else {
            self.surface.alert(EMAIL_REQUIRED_ALERT);
            return;
        };

        let service = Arc::clone(&self.service);
        let session = self.state.session().clone();
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            match service.generate_summary(&session, &email).await {
                Ok(()) => {
                    if let Some(mailbox) = mailbox.upgrade() {
                        let _ = mailbox.send(Command::SummaryDelivered);
                    }
                }
                Err(e) => error!(
                    name: "widget.summary.failed",
                    session_id = %session,
                    error = %e,
                    "Error generating and sending the summary"
                ),
            }
        });
    }

    fn download_chat(&self) {
        let service = Arc::clone(&self.service);
        let session = self.state.session().clone();
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            match service.download_chat(&session).await {
                Ok(contents) => {
                    if let Some(mailbox) = mailbox.upgrade() {
                        let _ = mailbox.send(Command::TranscriptReady(contents));
                    }
                }
                Err(e) => error!(
                    name: "widget.download.failed",
                    session_id = %session,
                    error = %e,
                    "Error downloading chat"
                ),
            }
        });
    }

    async fn save_transcript(&mut self, contents: Bytes) {
        let file_name = transcript_file_name(self.state.session(), &self.options.download_extension);
        match self.sink.save(&file_name, contents).await {
            Ok(path) => info!(
                name: "widget.download.saved",
                path = %path.display(),
                "Transcript saved"
            ),
            Err(e) => error!(
                name: "widget.download.save_failed",
                file_name = %file_name,
                error = %e,
                "Error saving chat transcript"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_file_name() {
        let session = SessionToken::from_string("1700000000000");
        assert_eq!(
            transcript_file_name(&session, DEFAULT_DOWNLOAD_EXTENSION),
            "chat_session_1700000000000.pdf"
        );
        assert_eq!(
            transcript_file_name(&session, "txt"),
            "chat_session_1700000000000.txt"
        );
    }
}
