//! Socket.IO text framing.
//!
//! The backend speaks Socket.IO v5 on top of Engine.IO v4 over a WebSocket.
//! Each WebSocket text message is one Engine.IO packet: a single type digit
//! followed by its payload. Engine.IO `message` packets carry one Socket.IO
//! packet, which again starts with a type digit, then an optional namespace
//! (`/ns,`), an optional numeric ack id, and a JSON payload.
//!
//! # Example
//!
//! ```rust
//! use krypto_chat::channel::codec::{EnginePacket, SocketPacket, decode_engine, decode_socket};
//!
//! let EnginePacket::Message(payload) = decode_engine(r#"42["bot_response",{"response":"Hi"}]"#).unwrap() else {
//!     panic!("expected message packet");
//! };
//! let SocketPacket::Event { name, .. } = decode_socket(&payload).unwrap() else {
//!     panic!("expected event packet");
//! };
//! assert_eq!(name, "bot_response");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Namespace used when a packet names none.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Frame decoding failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("empty frame")]
    Empty,
    #[error("unknown Engine.IO packet type '{0}'")]
    UnknownEngineType(char),
    #[error("unknown Socket.IO packet type '{0}'")]
    UnknownSocketType(char),
    #[error("unsupported packet: {0}")]
    Unsupported(&'static str),
    #[error("malformed payload: {0}")]
    Malformed(String),
}

fn malformed(err: impl std::fmt::Display) -> CodecError {
    CodecError::Malformed(err.to_string())
}

/// Engine.IO open handshake sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Engine.IO session id.
    pub sid: String,
    /// Transports the server offers to upgrade to.
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Server ping interval in milliseconds.
    #[serde(default)]
    pub ping_interval: u64,
    /// Server ping timeout in milliseconds.
    #[serde(default)]
    pub ping_timeout: u64,
    /// Maximum accepted payload size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// One Engine.IO packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

/// One Socket.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack_id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl SocketPacket {
    /// Namespace the packet belongs to.
    #[must_use]
    pub fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace, .. }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace, .. }
            | SocketPacket::ConnectError { namespace, .. } => namespace,
        }
    }

    /// An event on the default namespace without an ack id.
    pub fn event(name: impl Into<String>, payload: Value) -> Self {
        SocketPacket::Event {
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            name: name.into(),
            args: vec![payload],
        }
    }
}

/// Decode a WebSocket text message into an Engine.IO packet.
pub fn decode_engine(frame: &str) -> Result<EnginePacket, CodecError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let rest = chars.as_str();

    match kind {
        '0' => serde_json::from_str(rest)
            .map(EnginePacket::Open)
            .map_err(malformed),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(rest.to_string())),
        '3' => Ok(EnginePacket::Pong(rest.to_string())),
        '4' => Ok(EnginePacket::Message(rest.to_string())),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(CodecError::UnknownEngineType(other)),
    }
}

/// Encode an Engine.IO packet as a WebSocket text message.
pub fn encode_engine(packet: &EnginePacket) -> Result<String, CodecError> {
    let frame = match packet {
        EnginePacket::Open(handshake) => {
            format!("0{}", serde_json::to_string(handshake).map_err(malformed)?)
        }
        EnginePacket::Close => "1".to_string(),
        EnginePacket::Ping(data) => format!("2{data}"),
        EnginePacket::Pong(data) => format!("3{data}"),
        EnginePacket::Message(data) => format!("4{data}"),
        EnginePacket::Upgrade => "5".to_string(),
        EnginePacket::Noop => "6".to_string(),
    };
    Ok(frame)
}

/// Decode the payload of an Engine.IO message packet.
pub fn decode_socket(payload: &str) -> Result<SocketPacket, CodecError> {
    let mut chars = payload.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let (namespace, rest) = split_namespace(chars.as_str());

    match kind {
        '0' => Ok(SocketPacket::Connect {
            namespace,
            data: parse_optional(rest)?,
        }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let (ack_id, rest) = split_ack_id(rest)?;
            let mut args: Vec<Value> = serde_json::from_str(rest).map_err(malformed)?;
            if args.is_empty() {
                return Err(CodecError::Malformed("event without a name".to_string()));
            }
            let Value::String(name) = args.remove(0) else {
                return Err(CodecError::Malformed("event name is not a string".to_string()));
            };
            Ok(SocketPacket::Event {
                namespace,
                ack_id,
                name,
                args,
            })
        }
        '3' => {
            let (ack_id, rest) = split_ack_id(rest)?;
            let ack_id =
                ack_id.ok_or_else(|| CodecError::Malformed("ack without an id".to_string()))?;
            let args: Vec<Value> = serde_json::from_str(rest).map_err(malformed)?;
            Ok(SocketPacket::Ack {
                namespace,
                ack_id,
                args,
            })
        }
        '4' => Ok(SocketPacket::ConnectError {
            namespace,
            data: parse_optional(rest)?,
        }),
        '5' | '6' => Err(CodecError::Unsupported("binary packets")),
        other => Err(CodecError::UnknownSocketType(other)),
    }
}

/// Encode a Socket.IO packet as the payload of an Engine.IO message packet.
pub fn encode_socket(packet: &SocketPacket) -> Result<String, CodecError> {
    let (kind, ack_id, body) = match packet {
        SocketPacket::Connect { data, .. } => ('0', None, optional_json(data.as_ref())?),
        SocketPacket::Disconnect { .. } => ('1', None, String::new()),
        SocketPacket::Event {
            ack_id, name, args, ..
        } => {
            let mut array = Vec::with_capacity(args.len() + 1);
            array.push(Value::String(name.clone()));
            array.extend(args.iter().cloned());
            let body = serde_json::to_string(&array).map_err(malformed)?;
            ('2', *ack_id, body)
        }
        SocketPacket::Ack { ack_id, args, .. } => (
            '3',
            Some(*ack_id),
            serde_json::to_string(args).map_err(malformed)?,
        ),
        SocketPacket::ConnectError { data, .. } => ('4', None, optional_json(data.as_ref())?),
    };

    let mut out = String::new();
    out.push(kind);
    let namespace = packet.namespace();
    if namespace != DEFAULT_NAMESPACE {
        out.push_str(namespace);
        out.push(',');
    }
    if let Some(id) = ack_id {
        out.push_str(&id.to_string());
    }
    out.push_str(&body);
    Ok(out)
}

/// Encode a Socket.IO packet straight into a WebSocket text message.
pub fn encode_frame(packet: &SocketPacket) -> Result<String, CodecError> {
    encode_engine(&EnginePacket::Message(encode_socket(packet)?))
}

fn split_namespace(rest: &str) -> (String, &str) {
    if !rest.starts_with('/') {
        return (DEFAULT_NAMESPACE.to_string(), rest);
    }
    match rest.find(',') {
        Some(idx) => (rest[..idx].to_string(), &rest[idx + 1..]),
        None => (rest.to_string(), ""),
    }
}

fn split_ack_id(rest: &str) -> Result<(Option<u64>, &str), CodecError> {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Ok((None, rest));
    }
    let id = rest[..digits].parse().map_err(malformed)?;
    Ok((Some(id), &rest[digits..]))
}

fn parse_optional(rest: &str) -> Result<Option<Value>, CodecError> {
    if rest.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(rest).map(Some).map_err(malformed)
}

fn optional_json(data: Option<&Value>) -> Result<String, CodecError> {
    data.map_or_else(
        || Ok(String::new()),
        |v| serde_json::to_string(v).map_err(malformed),
    )
}
