//! Saves downloaded transcripts to disk.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::widget::FileSink;

/// Writes each download into a fixed directory, replacing same-named files.
#[derive(Debug, Clone)]
pub struct DiskSink {
    directory: PathBuf,
}

impl DiskSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl FileSink for DiskSink {
    async fn save(&self, file_name: &str, contents: Bytes) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(file_name);
        tokio::fs::write(&path, &contents).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_creates_directory_and_overwrites() {
        let root = tempfile::tempdir().unwrap();
        let sink = DiskSink::new(root.path().join("downloads"));

        let path = sink
            .save("chat_session_1.pdf", Bytes::from_static(b"first"))
            .await
            .unwrap();
        assert_eq!(path, root.path().join("downloads/chat_session_1.pdf"));

        sink.save("chat_session_1.pdf", Bytes::from_static(b"second"))
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }
}
