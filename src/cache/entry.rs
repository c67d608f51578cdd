//! A single cached download and its etag.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use super::checksum::{ChecksumCalculator, ContentHasher};
use super::etag_index::{file_exists, EtagStore};
use crate::error::{PluginError, Result};
use crate::ui::ProgressSink;

/// What the cache currently holds for a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieved {
    /// Path of the cached file, if it is present on disk.
    pub path: Option<PathBuf>,
    /// Etag recorded for the URL; empty if none.
    pub etag: String,
}

/// A cached file together with the etag of the download that produced it.
///
/// Entries are cheap views created by [`Cache::entry`](super::Cache::entry);
/// only the file and the index record persist.
pub struct CacheEntry<'a> {
    download_url: String,
    download_file: PathBuf,
    etags: &'a dyn EtagStore,
    checksums: &'a dyn ChecksumCalculator,
    progress: Rc<dyn ProgressSink>,
}

impl<'a> CacheEntry<'a> {
    /// Create an entry for `download_url` stored at `download_file`.
    pub fn new(
        download_url: impl Into<String>,
        download_file: impl Into<PathBuf>,
        etags: &'a dyn EtagStore,
        checksums: &'a dyn ChecksumCalculator,
        progress: Rc<dyn ProgressSink>,
    ) -> Self {
        Self {
            download_url: download_url.into(),
            download_file: download_file.into(),
            etags,
            checksums,
            progress,
        }
    }

    /// Get the URL this entry caches.
    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    /// Get the path the cached file is stored at.
    pub fn download_file(&self) -> &Path {
        &self.download_file
    }

    /// Look up the cached file and its etag.
    ///
    /// A missing file or a missing etag is not an error; failing to read the
    /// index is. A directory at the cache path is never a cached file.
    pub fn retrieve(&self) -> Result<Retrieved> {
        let path = (file_exists(&self.download_file) && !self.download_file.is_dir())
            .then(|| self.download_file.clone());
        let etag = self.etags.etag_for_url(&self.download_url)?;

        Ok(Retrieved { path, etag })
    }

    /// Write `contents` to the cache file, verify it and record `etag`.
    ///
    /// The checksum is computed from the file on disk with `hasher` and must
    /// equal `checksum` exactly. The etag is only recorded once the file has
    /// been verified, and only if it is non-empty. A file that fails
    /// verification is left on disk.
    pub fn store<R: Read>(
        &self,
        contents: R,
        etag: &str,
        checksum: &str,
        hasher: Box<dyn ContentHasher>,
    ) -> Result<()> {
        if let Err(err) = write_to_file(contents, &self.download_file) {
            self.progress.error(&format!(
                "Error downloading {}: {}",
                self.download_file.display(),
                err
            ));
            return Err(err);
        }

        let calculated = match self.checksums.calculate_checksum(&self.download_file, hasher) {
            Ok(sum) => sum,
            Err(err) => {
                self.progress.error(&format!(
                    "Error calculating checksum of {}: {}",
                    self.download_file.display(),
                    err
                ));
                return Err(err);
            }
        };

        if calculated != checksum {
            warn!(
                "Checksum mismatch for {}: expected {}, got {}",
                self.download_file.display(),
                checksum,
                calculated
            );
            return Err(PluginError::ChecksumMismatch {
                path: self.download_file.clone(),
                expected: checksum.to_string(),
                actual: calculated,
            });
        }

        if !etag.is_empty() {
            self.etags
                .set_etag_for_url(&self.download_url, etag)
                .map_err(|source| PluginError::EtagNotRecorded {
                    path: self.download_file.clone(),
                    source: Box::new(source),
                })?;
        }

        debug!("Stored {} as {}", self.download_url, self.download_file.display());
        Ok(())
    }
}

/// Copy `contents` into a freshly truncated file at `path`.
///
/// Both the source and the file are dropped on return, whatever the outcome.
fn write_to_file<R: Read>(mut contents: R, path: &Path) -> Result<()> {
    let mut file = File::create(path).map_err(|source| PluginError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    io::copy(&mut contents, &mut file)?;
    Ok(())
}
