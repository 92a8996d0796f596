//! Request-response adapter for the auxiliary transcript actions.
//!
//! - [`TranscriptService`]: the two calls the widget issues
//! - [`client::ApiClient`]: reqwest implementation against the backend
//! - [`types`]: request bodies

pub mod client;
pub mod types;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::session::SessionToken;

pub use client::ApiClient;

/// Backend operations on a whole chat session.
#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// Ask the backend to summarize the session and email it to `email`.
    async fn generate_summary(&self, session: &SessionToken, email: &str) -> Result<()>;

    /// Fetch the session transcript as a binary document.
    async fn download_chat(&self, session: &SessionToken) -> Result<Bytes>;
}
