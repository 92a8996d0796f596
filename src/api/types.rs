//! Request bodies for the transcript endpoints.

use serde::Serialize;

use crate::session::SessionToken;

/// Body of `POST /generate_summary`.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRequest<'a> {
    /// Session to summarize.
    pub session_id: &'a SessionToken,
    /// Recipient address.
    pub email: &'a str,
}

/// Body of `POST /download_chat`.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadRequest<'a> {
    /// Session to export.
    pub session_id: &'a SessionToken,
}
