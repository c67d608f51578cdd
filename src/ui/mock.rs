//! Recording sink for testing.
//!
//! `RecordingSink` implements [`ProgressSink`] and captures every message
//! for later assertion.

use std::cell::RefCell;

use super::ProgressSink;

/// Progress sink that records messages instead of printing them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: RefCell<Vec<String>>,
    warnings: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Informational messages received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Warnings received so far.
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }

    /// Errors received so far.
    pub fn errors(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    /// Check whether any message, warning or error contains `text`.
    pub fn saw(&self, text: &str) -> bool {
        [&self.messages, &self.warnings, &self.errors]
            .iter()
            .any(|cell| cell.borrow().iter().any(|m| m.contains(text)))
    }
}

impl ProgressSink for RecordingSink {
    fn message(&self, msg: &str) {
        self.messages.borrow_mut().push(msg.to_string());
    }

    fn warning(&self, msg: &str) {
        self.warnings.borrow_mut().push(msg.to_string());
    }

    fn error(&self, msg: &str) {
        self.errors.borrow_mut().push(msg.to_string());
    }
}
