//! Krypto Chat
//!
//! A streaming chat widget client: it keeps a transcript of the conversation,
//! forwards user messages to the backend over a realtime event channel, shows
//! streamed bot responses as they arrive, and offers two auxiliary actions
//! (email a summary, download the transcript).
//!
//! # Architecture
//!
//! - **Widget**: single-threaded actor owning the transcript view-model
//! - **Channel**: Socket.IO event transport over WebSocket
//! - **API**: reqwest client for the summary and download endpoints
//! - **UI**: terminal rendition of the message bubbles
//!
//! # Modules
//!
//! - [`api`]: Request-response adapter
//! - [`channel`]: Realtime transport contract, wire codec and WebSocket transport
//! - [`config`]: Layered configuration
//! - [`session`]: Session identity
//! - [`transcript`]: Transcript entries
//! - [`widget`]: The chat widget actor and its view-model

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::map_err_ignore)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::cargo_common_metadata)]

pub mod api;
pub mod channel;
pub mod config;
pub mod error;
pub mod session;
pub mod transcript;
pub mod ui;
pub mod widget;

pub use error::{Error, Result};
