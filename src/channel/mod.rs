//! Realtime event channel.
//!
//! The widget talks to the backend over a long-lived bidirectional event
//! channel. This module defines the contract independently of the wire:
//!
//! - [`EventName`]: the three inbound event names the widget subscribes to
//! - [`InboundEvent`] / [`OutboundEvent`]: typed payloads
//! - [`Transport`]: emit + subscribe/unsubscribe by name
//! - [`Listeners`]: handler registry shared by transport implementations
//!
//! [`socket::SocketIoTransport`] is the production implementation.

pub mod codec;
pub mod socket;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::SessionToken;

/// Names of the inbound events a client can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Namespace connection established.
    Connect,
    /// One streamed response fragment.
    BotResponse,
    /// Connection lost or closed.
    Disconnect,
}

impl EventName {
    /// Every subscribable event, in subscription order.
    pub const ALL: [EventName; 3] = [
        EventName::Connect,
        EventName::BotResponse,
        EventName::Disconnect,
    ];

    /// Wire name of the event.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::Connect => "connect",
            EventName::BotResponse => "bot_response",
            EventName::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a `bot_response` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotResponse {
    /// Fragment to concatenate onto the in-flight response.
    pub response: String,
}

/// Payload of a `user_message` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    /// Correlation key of the sending widget.
    pub session_id: SessionToken,
    /// Raw user input.
    pub message: String,
}

/// Events received from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Connect,
    BotResponse(BotResponse),
    Disconnect,
}

impl InboundEvent {
    /// The subscription name this event is delivered under.
    #[must_use]
    pub fn name(&self) -> EventName {
        match self {
            InboundEvent::Connect => EventName::Connect,
            InboundEvent::BotResponse(_) => EventName::BotResponse,
            InboundEvent::Disconnect => EventName::Disconnect,
        }
    }
}

/// Events sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    UserMessage(UserMessage),
}

impl OutboundEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::UserMessage(_) => "user_message",
        }
    }

    /// JSON payload of the event.
    pub fn payload(&self) -> Result<serde_json::Value> {
        match self {
            OutboundEvent::UserMessage(msg) => Ok(serde_json::to_value(msg)?),
        }
    }
}

/// Callback invoked for every dispatched event of a subscribed name.
pub type EventHandler = Arc<dyn Fn(InboundEvent) + Send + Sync>;

/// A bidirectional named-event channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Queue an event for delivery. Does not wait for any acknowledgment.
    async fn emit(&self, event: OutboundEvent) -> Result<()>;

    /// Register a handler for an event name.
    fn on(&self, event: EventName, handler: EventHandler);

    /// Remove every handler registered for an event name.
    fn off(&self, event: EventName);
}

/// Thread-safe registry of event handlers.
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Arc<RwLock<HashMap<EventName, Vec<EventHandler>>>>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let counts: HashMap<&'static str, usize> =
            guard.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        f.debug_struct("Listeners").field("handlers", &counts).finish()
    }
}

impl Listeners {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler for `event`.
    pub fn add(&self, event: EventName, handler: EventHandler) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.entry(event).or_default().push(handler);
    }

    /// Drop every handler for `event`.
    pub fn remove_all(&self, event: EventName) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(&event);
    }

    /// Number of handlers registered for `event`.
    #[must_use]
    pub fn count(&self, event: EventName) -> usize {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(&event).map_or(0, Vec::len)
    }

    /// Invoke every handler registered for the event's name.
    ///
    /// Handlers are cloned out of the registry first so a handler may call
    /// back into [`Listeners::add`] or [`Listeners::remove_all`].
    pub fn dispatch(&self, event: &InboundEvent) {
        let handlers: Vec<EventHandler> = {
            let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            guard.get(&event.name()).cloned().unwrap_or_default()
        };
        for handler in handlers {
            handler(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (EventHandler, Arc<Mutex<Vec<InboundEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: EventHandler = Arc::new(move |evt| sink.lock().unwrap().push(evt));
        (handler, seen)
    }

    #[test]
    fn test_dispatch_routes_by_name() {
        let listeners = Listeners::new();
        let (handler, seen) = recorder();
        listeners.add(EventName::BotResponse, handler);

        listeners.dispatch(&InboundEvent::Connect);
        listeners.dispatch(&InboundEvent::BotResponse(BotResponse {
            response: "Hel".to_string(),
        }));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name(), EventName::BotResponse);
    }

    #[test]
    fn test_remove_all_silences_event() {
        let listeners = Listeners::new();
        let (first, seen) = recorder();
        listeners.add(EventName::Disconnect, Arc::clone(&first));
        listeners.add(EventName::Disconnect, first);
        assert_eq!(listeners.count(EventName::Disconnect), 2);

        listeners.remove_all(EventName::Disconnect);
        listeners.dispatch(&InboundEvent::Disconnect);

        assert_eq!(listeners.count(EventName::Disconnect), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_user_message_payload() {
        let event = OutboundEvent::UserMessage(UserMessage {
            session_id: SessionToken::from_string("42"),
            message: "Hi".to_string(),
        });
        assert_eq!(event.name(), "user_message");
        assert_eq!(
            event.payload().unwrap(),
            serde_json::json!({ "session_id": "42", "message": "Hi" })
        );
    }
}
