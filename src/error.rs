//! Error types for plugin operations.
//!
//! This module defines [`PluginError`], the error type used throughout the
//! crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - I/O failures on a known file carry the path ([`PluginError::FileAccess`])
//! - Failures while streaming content surface unchanged ([`PluginError::Io`])
//! - A file that was stored but whose etag could not be recorded is reported
//!   as [`PluginError::EtagNotRecorded`] so callers can tell it apart from a
//!   failed download
//! - Use `anyhow::Error` (via `PluginError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error produced by an HTTP transport.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// No usable home directory could be determined.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A file or directory could not be accessed.
    #[error("Cannot access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The etag index file does not hold a valid document.
    #[error("Etag index {path} is not valid: {source}")]
    IndexFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The stored file does not match the expected checksum.
    #[error("Downloaded file '{path}' checksum does not match supplied value '{expected}'")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// The file was stored and verified but its etag was not written.
    #[error("Downloaded file '{path}' was stored but its etag could not be recorded: {source}")]
    EtagNotRecorded {
        path: PathBuf,
        #[source]
        source: Box<PluginError>,
    },

    /// The HTTP request could not be completed.
    #[error("Download from URL {url:?} failed: {source}")]
    Download {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The server answered with a status the downloader does not handle.
    #[error("Unexpected response '{status}' downloading from '{url}'")]
    UnexpectedStatus { status: u16, url: String },

    /// A Data Flow, Skipper or service broker request failed.
    #[error("{message}")]
    Server { url: String, message: String },

    /// A plugin version string is malformed.
    #[error("pluginVersion {version:?} has invalid format. {message}")]
    InvalidVersion { version: String, message: String },

    /// A shell process could not be started.
    #[error("Failed to launch {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A shell process exited unsuccessfully.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_access_displays_path() {
        let err = PluginError::FileAccess {
            path: PathBuf::from("/cache/.cachedata"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/cache/.cachedata"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn checksum_mismatch_names_file() {
        let err = PluginError::ChecksumMismatch {
            path: PathBuf::from("/cache/shell.jar"),
            expected: "abc".into(),
            actual: "def".into(),
        };
        assert_eq!(
            err.to_string(),
            "Downloaded file '/cache/shell.jar' checksum does not match supplied value 'abc'"
        );
    }

    #[test]
    fn etag_not_recorded_keeps_cause() {
        let cause = PluginError::FileAccess {
            path: PathBuf::from("/cache/.cachedata"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let err = PluginError::EtagNotRecorded {
            path: PathBuf::from("/cache/shell.jar"),
            source: Box::new(cause),
        };
        let msg = err.to_string();
        assert!(msg.contains("/cache/shell.jar"));
        assert!(msg.contains("/cache/.cachedata"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn download_displays_url_and_cause() {
        let err = PluginError::Download {
            url: "http://host/file.jar".into(),
            source: "connection refused".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://host/file.jar"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn unexpected_status_displays_code_and_url() {
        let err = PluginError::UnexpectedStatus {
            status: 404,
            url: "http://host/file.jar".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected response '404' downloading from 'http://host/file.jar'"
        );
    }

    #[test]
    fn invalid_version_displays_version() {
        let err = PluginError::InvalidVersion {
            version: "2.0".into(),
            message: "Expected 3 dot-separated integer components.".into(),
        };
        assert_eq!(
            err.to_string(),
            "pluginVersion \"2.0\" has invalid format. Expected 3 dot-separated integer components."
        );
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: PluginError = io_err.into();
        assert!(matches!(err, PluginError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(PluginError::Config {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
