//! Persistent URL to etag index.
//!
//! The index is a single JSON object keyed by URL, stored next to the cached
//! files. It is re-read from disk on every lookup so it always reflects the
//! latest on-disk state.
//!
//! There is no locking: two invocations sharing one cache directory can lose
//! each other's updates.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PluginError, Result};

#[cfg(unix)]
const INDEX_FILE_MODE: u32 = 0o644;

const TEMP_SUFFIX: &str = ".tmp";

type IndexDocument = BTreeMap<String, String>;

/// Lookup and update of etags by URL.
pub trait EtagStore {
    /// Get the etag recorded for `url`, or an empty string if there is none.
    fn etag_for_url(&self, url: &str) -> Result<String>;

    /// Record `etag` for `url`, replacing any previous value.
    fn set_etag_for_url(&self, url: &str, etag: &str) -> Result<()>;
}

/// File-backed [`EtagStore`].
#[derive(Debug, Clone)]
pub struct EtagIndex {
    path: PathBuf,
}

impl EtagIndex {
    /// Open the index at `path`, creating an empty one if the file is missing.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !file_exists(&path) {
            debug!("Creating etag index {}", path.display());
            write_index(&path, &IndexDocument::new())?;
        }

        Ok(Self { path })
    }

    /// Get the index file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<IndexDocument> {
        let bytes = fs::read(&self.path).map_err(|source| PluginError::FileAccess {
            path: self.path.clone(),
            source,
        })?;

        // Older releases created the index as an empty file.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(IndexDocument::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| PluginError::IndexFormat {
            path: self.path.clone(),
            source,
        })
    }
}

impl EtagStore for EtagIndex {
    fn etag_for_url(&self, url: &str) -> Result<String> {
        let index = self.load()?;
        Ok(index.get(url).cloned().unwrap_or_default())
    }

    fn set_etag_for_url(&self, url: &str, etag: &str) -> Result<()> {
        let mut index = self.load()?;
        index.insert(url.to_string(), etag.to_string());
        debug!("Recording etag {} for {}", etag, url);
        write_index(&self.path, &index)
    }
}

/// Write the whole index to a sibling file, then rename it into place.
///
/// A reader sees either the previous index or the new one, never a torn write.
fn write_index(path: &Path, index: &IndexDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(index).map_err(|source| PluginError::IndexFormat {
        path: path.to_path_buf(),
        source,
    })?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(INDEX_FILE_MODE);
    }

    let access_error = |source| PluginError::FileAccess {
        path: path.to_path_buf(),
        source,
    };
    let temp_path = temp_path_for(path);
    {
        let mut file = options.open(&temp_path).map_err(access_error)?;
        file.write_all(json.as_bytes()).map_err(access_error)?;
    }
    fs::rename(&temp_path, path).map_err(access_error)?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// Anything other than a definite "not found" counts as present.
pub(crate) fn file_exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(true)
}
