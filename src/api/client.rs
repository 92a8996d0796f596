//! HTTP client for the transcript endpoints.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use url::Url;

use super::TranscriptService;
use super::types::{DownloadRequest, SummaryRequest};
use crate::error::{Error, Result};
use crate::session::SessionToken;

/// HTTP client for the chat backend.
///
/// # Example
///
/// ```rust,no_run
/// use krypto_chat::api::{ApiClient, TranscriptService};
/// use krypto_chat::session::SessionToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("http://localhost:5000")?;
/// let session = SessionToken::generate();
///
/// client.generate_summary(&session, "me@example.com").await?;
/// let pdf = client.download_chat(&session).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the backend (e.g., "http://localhost:5000")
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Turn any non-2xx response into [`Error::Api`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".into());
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TranscriptService for ApiClient {
    async fn generate_summary(&self, session: &SessionToken, email: &str) -> Result<()> {
        let req = SummaryRequest {
            session_id: session,
            email,
        };
        let response = self
            .http
            .post(self.url("/generate_summary")?)
            .json(&req)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        debug!(name: "api.summary.accepted", session_id = %session, "Summary request accepted");
        Ok(())
    }

    async fn download_chat(&self, session: &SessionToken) -> Result<Bytes> {
        let req = DownloadRequest {
            session_id: session,
        };
        let response = self
            .http
            .post(self.url("/download_chat")?)
            .json(&req)
            .send()
            .await?;
        let body = Self::ensure_success(response).await?.bytes().await?;
        debug!(
            name: "api.download.received",
            session_id = %session,
            bytes = body.len(),
            "Transcript received"
        );
        Ok(body)
    }
}
