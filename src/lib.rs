//! Download cache and launcher for the Spring Cloud Data Flow and Skipper
//! shells.
//!
//! The shell JAR a server advertises is fetched through a local cache that
//! uses etags to avoid downloading unchanged content again, verified against
//! the advertised checksum, and run with `java -jar`.
//!
//! # Modules
//!
//! - [`cache`] - Cached files, their etag index, and checksums
//! - [`cli`] - Command-line interface and argument parsing
//! - [`download`] - Conditional download through the cache
//! - [`error`] - Error types and result aliases
//! - [`http`] - Blocking HTTP transport
//! - [`plugin`] - Plugin identity and version
//! - [`server`] - Data Flow, Skipper and service broker lookups
//! - [`shell`] - Shell command lines and process execution
//! - [`ui`] - Progress output
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use dataflow_plugin::cache::{Cache, HashAlgorithm};
//! use dataflow_plugin::ui::RecordingSink;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let cache = Cache::with_root(dir.path(), Rc::new(RecordingSink::new())).unwrap();
//!
//! let entry = cache.entry("http://host/path/shell.jar");
//! entry
//!     .store(
//!         "download content".as_bytes(),
//!         "\"v1\"",
//!         "79dbdd760b4e80686e81c81466424ca6a21ed70b353a19e2154984e41a3e6e4b",
//!         HashAlgorithm::Sha256.hasher(),
//!     )
//!     .unwrap();
//!
//! let retrieved = entry.retrieve().unwrap();
//! assert_eq!(retrieved.etag, "\"v1\"");
//! assert_eq!(retrieved.path, Some(dir.path().join("shell.jar")));
//! ```

pub mod cache;
pub mod cli;
pub mod download;
pub mod error;
pub mod http;
pub mod plugin;
pub mod server;
pub mod shell;
pub mod ui;

pub use error::{PluginError, Result};
