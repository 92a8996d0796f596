//! Terminal front end for the widget.
//!
//! # Structure
//!
//! - [`bubble`]: single message bubble rendering
//! - [`terminal`]: [`Surface`](crate::widget::Surface) printing to a terminal
//! - [`sink`]: [`FileSink`](crate::widget::FileSink) writing downloads to disk

pub mod bubble;
pub mod sink;
pub mod terminal;

pub use sink::DiskSink;
pub use terminal::{SharedLines, TerminalSurface};
