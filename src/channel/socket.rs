//! Socket.IO transport over WebSocket.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use super::codec::{
    self, DEFAULT_NAMESPACE, EnginePacket, SocketPacket, decode_engine, decode_socket,
};
use super::{BotResponse, EventHandler, EventName, InboundEvent, Listeners, OutboundEvent, Transport};
use crate::error::{Error, Result};

/// Engine.IO protocol revision spoken by the backend.
const ENGINE_IO_VERSION: &str = "4";

/// Build the WebSocket endpoint for a Socket.IO server base URL.
///
/// `https` maps to `wss` and `http` to `ws`; the Socket.IO path and the
/// Engine.IO query parameters are appended.
pub fn websocket_endpoint(base_url: &Url) -> Result<Url> {
    let scheme = match base_url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(Error::UnsupportedScheme(other.to_string())),
    };
    let mut url = base_url.join("/socket.io/")?;
    url.set_scheme(scheme)
        .map_err(|()| Error::UnsupportedScheme(scheme.to_string()))?;
    url.query_pairs_mut()
        .clear()
        .append_pair("EIO", ENGINE_IO_VERSION)
        .append_pair("transport", "websocket");
    Ok(url)
}

/// A long-lived Socket.IO connection on the default namespace.
///
/// Construction performs no I/O; [`SocketIoTransport::connect`] opens the
/// WebSocket and starts the connection task. Handlers may be registered
/// before or after connecting.
#[derive(Debug)]
pub struct SocketIoTransport {
    endpoint: Url,
    listeners: Listeners,
    outbound_tx: mpsc::UnboundedSender<String>,
    outbound_rx: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
    shutdown: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SocketIoTransport {
    /// Create a transport for the server at `base_url`.
    pub fn new(base_url: &Url) -> Result<Self> {
        let endpoint = websocket_endpoint(base_url)?;
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Ok(Self {
            endpoint,
            listeners: Listeners::new(),
            outbound_tx,
            outbound_rx: Mutex::new(Some(outbound_rx)),
            shutdown: CancellationToken::new(),
            task: Mutex::new(None),
        })
    }

    /// WebSocket URL this transport connects to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Open the WebSocket and spawn the connection task.
    ///
    /// Returns once the WebSocket handshake has completed. A transport can
    /// only be connected once; there is no reconnection.
    pub async fn connect(&self) -> Result<()> {
        let outbound_rx = self
            .outbound_rx
            .lock()
            .await
            .take()
            .ok_or(Error::ChannelClosed)?;

        let (ws_stream, _) = connect_async(self.endpoint.as_str()).await?;
        info!(
            name: "channel.socket.opened",
            endpoint = %self.endpoint,
            "WebSocket opened"
        );

        let connection = Connection {
            listeners: self.listeners.clone(),
            shutdown: self.shutdown.clone(),
            namespace_connected: false,
        };
        let handle = tokio::spawn(connection.run(ws_stream, outbound_rx));
        *self.task.lock().await = Some(handle);
        Ok(())
    }

    /// Disconnect and wait for the connection task to finish.
    pub async fn close(&self) {
        self.shutdown.cancel();
        let handle = self.task.lock().await.take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            error!(name: "channel.socket.join_failed", error = %e, "Connection task failed");
        }
    }
}

#[async_trait]
impl Transport for SocketIoTransport {
    async fn emit(&self, event: OutboundEvent) -> Result<()> {
        let packet = SocketPacket::event(event.name(), event.payload()?);
        let frame = codec::encode_frame(&packet)?;
        self.outbound_tx
            .send(frame)
            .map_err(|_| Error::ChannelClosed)
    }

    fn on(&self, event: EventName, handler: EventHandler) {
        self.listeners.add(event, handler);
    }

    fn off(&self, event: EventName) {
        self.listeners.remove_all(event);
    }
}

/// What the connection loop should do after handling an inbound frame.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Reply(String),
    Stop,
}

struct Connection {
    listeners: Listeners,
    shutdown: CancellationToken,
    namespace_connected: bool,
}

impl Connection {
    async fn run<S>(mut self, ws_stream: S, mut outbound_rx: mpsc::UnboundedReceiver<String>)
    where
        S: futures::Stream<Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>>
            + futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
            + Unpin,
    {
        let (mut write, mut read) = ws_stream.split();
        let shutdown = self.shutdown.clone();

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => {
                    if let Ok(frame) = codec::encode_frame(&SocketPacket::Disconnect {
                        namespace: DEFAULT_NAMESPACE.to_string(),
                    }) {
                        let _ = write.send(Message::Text(frame)).await;
                    }
                    let _ = write.close().await;
                    break;
                }
                inbound = read.next() => {
                    let step = match inbound {
                        Some(Ok(Message::Text(text))) => self.handle_frame(&text),
                        Some(Ok(Message::Binary(bin))) => match String::from_utf8(bin) {
                            Ok(text) => self.handle_frame(&text),
                            Err(_) => Step::Continue,
                        },
                        Some(Ok(Message::Ping(payload))) => {
                            if let Err(e) = write.send(Message::Pong(payload)).await {
                                error!(name: "channel.socket.pong_failed", error = %e, "WebSocket pong failed");
                                break;
                            }
                            Step::Continue
                        }
                        Some(Ok(Message::Close(_))) | None => Step::Stop,
                        Some(Ok(_)) => Step::Continue,
                        Some(Err(e)) => {
                            error!(name: "channel.socket.read_failed", error = %e, "WebSocket read failed");
                            Step::Stop
                        }
                    };
                    match step {
                        Step::Continue => {}
                        Step::Reply(frame) => {
                            if let Err(e) = write.send(Message::Text(frame)).await {
                                error!(name: "channel.socket.write_failed", error = %e, "WebSocket write failed");
                                break;
                            }
                        }
                        Step::Stop => break,
                    }
                }
                // Emits queue until the namespace handshake completes.
                maybe_frame = outbound_rx.recv(), if self.namespace_connected => {
                    let Some(frame) = maybe_frame else { break };
                    debug!(name: "channel.socket.emit", frame_length = frame.len(), "Sending frame");
                    if let Err(e) = write.send(Message::Text(frame)).await {
                        error!(name: "channel.socket.write_failed", error = %e, "WebSocket write failed");
                        break;
                    }
                }
            }
        }

        if self.namespace_connected {
            self.listeners.dispatch(&InboundEvent::Disconnect);
        }
        info!(name: "channel.socket.closed", "WebSocket connection closed");
    }

    fn handle_frame(&mut self, text: &str) -> Step {
        let packet = match decode_engine(text) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(name: "channel.socket.bad_frame", error = %e, "Skipping undecodable frame");
                return Step::Continue;
            }
        };

        match packet {
            EnginePacket::Open(handshake) => {
                debug!(
                    name: "channel.socket.handshake",
                    sid = %handshake.sid,
                    ping_interval = handshake.ping_interval,
                    "Engine.IO handshake received"
                );
                match codec::encode_frame(&SocketPacket::Connect {
                    namespace: DEFAULT_NAMESPACE.to_string(),
                    data: None,
                }) {
                    Ok(frame) => Step::Reply(frame),
                    Err(e) => {
                        error!(name: "channel.socket.encode_failed", error = %e, "Could not encode connect");
                        Step::Stop
                    }
                }
            }
            EnginePacket::Ping(data) => match codec::encode_engine(&EnginePacket::Pong(data)) {
                Ok(frame) => Step::Reply(frame),
                Err(_) => Step::Continue,
            },
            EnginePacket::Close => Step::Stop,
            EnginePacket::Message(payload) => self.handle_packet(&payload),
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => Step::Continue,
        }
    }

    fn handle_packet(&mut self, payload: &str) -> Step {
        let packet = match decode_socket(payload) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(name: "channel.socket.bad_packet", error = %e, "Skipping undecodable packet");
                return Step::Continue;
            }
        };
        if packet.namespace() != DEFAULT_NAMESPACE {
            return Step::Continue;
        }

        match packet {
            SocketPacket::Connect { .. } => {
                self.namespace_connected = true;
                self.listeners.dispatch(&InboundEvent::Connect);
                Step::Continue
            }
            SocketPacket::Disconnect { .. } => Step::Stop,
            SocketPacket::ConnectError { data, .. } => {
                error!(name: "channel.socket.connect_error", data = ?data, "Server refused namespace connection");
                Step::Stop
            }
            SocketPacket::Event { name, args, .. } => {
                if let Some(event) = inbound_event(&name, args) {
                    self.listeners.dispatch(&event);
                }
                Step::Continue
            }
            SocketPacket::Ack { .. } => Step::Continue,
        }
    }
}

/// Map a named server event onto a typed [`InboundEvent`].
///
/// Unknown event names and undecodable payloads are dropped.
fn inbound_event(name: &str, args: Vec<serde_json::Value>) -> Option<InboundEvent> {
    if name != EventName::BotResponse.as_str() {
        debug!(name: "channel.socket.unhandled_event", event = %name, "Ignoring event");
        return None;
    }
    let payload = args.into_iter().next()?;
    match serde_json::from_value::<BotResponse>(payload) {
        Ok(response) => Some(InboundEvent::BotResponse(response)),
        Err(e) => {
            warn!(name: "channel.socket.bad_payload", event = %name, error = %e, "Dropping malformed payload");
            None
        }
    }
}
