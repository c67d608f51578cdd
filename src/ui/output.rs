//! Output mode and terminal writer.

use std::str::FromStr;

use console::{style, Term};

use super::ProgressSink;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show progress, warnings and errors.
    #[default]
    Normal,
    /// Show warnings and errors only.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Check if this mode shows progress messages.
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Progress writer for the terminal.
///
/// Everything goes to stderr; stdout belongs to the launched shell.
#[derive(Debug)]
pub struct Output {
    mode: OutputMode,
    term: Term,
}

impl Output {
    /// Create a new output writer.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            term: Term::stderr(),
        }
    }

    /// Get the output mode.
    pub fn mode(&self) -> OutputMode {
        self.mode
    }
}

impl ProgressSink for Output {
    fn message(&self, msg: &str) {
        if self.mode.shows_progress() {
            let _ = self.term.write_line(msg);
        }
    }

    fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&style(msg).yellow().to_string());
    }

    fn error(&self, msg: &str) {
        let _ = self.term.write_line(&style(msg).red().to_string());
    }
}
