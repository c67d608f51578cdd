//! User-facing progress output.
//!
//! This module provides:
//! - [`ProgressSink`] trait, the destination for progress and diagnostic
//!   messages emitted while caching and launching shells
//! - [`Output`] for terminal usage
//! - [`RecordingSink`] for capturing messages in tests
//!
//! # Example
//!
//! ```
//! use dataflow_plugin::ui::{ProgressSink, RecordingSink};
//!
//! let sink = RecordingSink::new();
//! sink.message("Downloading http://host/shell.jar");
//! assert_eq!(sink.messages(), vec!["Downloading http://host/shell.jar"]);
//! ```

pub mod mock;
pub mod output;

pub use mock::RecordingSink;
pub use output::{Output, OutputMode};

/// Destination for progress messages.
///
/// Sinks are shared between a cache and every entry it hands out, so the
/// methods take `&self`.
pub trait ProgressSink {
    /// Display an informational message.
    fn message(&self, msg: &str);

    /// Display a warning.
    fn warning(&self, msg: &str);

    /// Display an error.
    fn error(&self, msg: &str);
}
