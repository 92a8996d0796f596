//! Seams between the widget and whatever displays it.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::widget::state::ChatState;

/// The visual side of the widget.
///
/// Implementations own bubble rendering, scrolling and the blocking
/// prompt/alert dialogs. All methods are invoked from the widget's actor, one
/// at a time.
#[async_trait]
pub trait Surface: Send {
    /// Render the current state. Called after every transcript mutation.
    fn render(&mut self, state: &ChatState);

    /// Bring the newest entry into view. Called once `render` has returned.
    fn scroll_to_latest(&mut self);

    /// Ask the user for a line of text. `None` means the prompt was dismissed.
    async fn prompt(&mut self, message: &str) -> Option<String>;

    /// Show a message the user must acknowledge.
    fn alert(&mut self, message: &str);
}

/// Destination for downloaded transcript files.
#[async_trait]
pub trait FileSink: Send + Sync {
    /// Persist `contents` under `file_name` and return where it landed.
    async fn save(&self, file_name: &str, contents: Bytes) -> Result<PathBuf>;
}
