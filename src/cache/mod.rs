//! Download cache.
//!
//! Downloaded artifacts live as plain files in a single cache directory,
//! named after the final segment of their URL. The etag of each download is
//! recorded in an index file alongside them so later downloads can be made
//! conditional.

pub mod checksum;
pub mod entry;
pub mod etag_index;

pub use checksum::{
    calculate_checksum, ChecksumCalculator, ContentHasher, DigestHasher, FileChecksumCalculator,
    HashAlgorithm,
};
pub use entry::{CacheEntry, Retrieved};
pub use etag_index::{EtagIndex, EtagStore};

use std::ffi::OsString;
use std::fs::DirBuilder;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::error::{PluginError, Result};
use crate::ui::ProgressSink;

/// Name of the etag index file inside the cache directory.
pub const CACHE_INDEX_FILE: &str = ".cachedata";

/// Primary environment variable for the home directory.
pub const CF_HOME_VAR: &str = "CF_HOME";

/// Fallback environment variable for the home directory.
pub const HOME_VAR: &str = "HOME";

const CF_DIR: &str = ".cf";
const PLUGIN_DIR: &str = "spring-cloud-dataflow-for-pcf";
const CACHE_DIR: &str = "cache";

#[cfg(unix)]
const CACHE_DIR_MODE: u32 = 0o755;

/// Resolve the home directory from `CF_HOME`, falling back to `HOME`.
///
/// Empty values count as unset.
pub fn resolve_home(lookup: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    [CF_HOME_VAR, HOME_VAR]
        .into_iter()
        .filter_map(lookup)
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Get the cache directory under a home directory.
pub fn cache_root_under(home: &Path) -> PathBuf {
    home.join(CF_DIR).join(PLUGIN_DIR).join(CACHE_DIR)
}

/// Get the cache directory for the current process environment.
pub fn default_cache_dir() -> Result<PathBuf> {
    let home = resolve_home(|var| std::env::var_os(var)).ok_or_else(|| PluginError::Config {
        message: format!("neither {} nor {} is set", CF_HOME_VAR, HOME_VAR),
    })?;

    Ok(cache_root_under(&home))
}

/// The download cache.
///
/// Owns the cache directory and the etag index and hands out
/// [`CacheEntry`] views keyed by URL.
pub struct Cache {
    root: PathBuf,
    index: EtagIndex,
    checksums: FileChecksumCalculator,
    progress: Rc<dyn ProgressSink>,
}

impl Cache {
    /// Open the cache under the home directory from the environment.
    pub fn new(progress: Rc<dyn ProgressSink>) -> Result<Self> {
        Self::with_root(default_cache_dir()?, progress)
    }

    /// Open the cache at an explicit directory, creating it if needed.
    pub fn with_root(root: impl Into<PathBuf>, progress: Rc<dyn ProgressSink>) -> Result<Self> {
        let root = root.into();

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(CACHE_DIR_MODE);
        }
        builder.create(&root).map_err(|source| PluginError::FileAccess {
            path: root.clone(),
            source,
        })?;

        let index = EtagIndex::new(root.join(CACHE_INDEX_FILE))?;
        debug!("Using download cache {}", root.display());

        Ok(Self {
            root,
            index,
            checksums: FileChecksumCalculator,
            progress,
        })
    }

    /// Get the entry caching `url`.
    ///
    /// The file name is the text after the last `/`, so URLs that end the
    /// same way share a cache file. A URL ending in `/` maps to the cache
    /// directory itself and never has a cached file.
    pub fn entry(&self, url: &str) -> CacheEntry<'_> {
        let file_name = url.rsplit('/').next().unwrap_or(url);

        CacheEntry::new(
            url,
            self.root.join(file_name),
            &self.index,
            &self.checksums,
            Rc::clone(&self.progress),
        )
    }

    /// Get the cache directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the etag index file path.
    pub fn index_path(&self) -> &Path {
        self.index.path()
    }

    /// Get the progress sink shared with entries.
    pub fn progress(&self) -> &Rc<dyn ProgressSink> {
        &self.progress
    }
}
