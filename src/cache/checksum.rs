//! Content checksums for downloaded files.
//!
//! The digest algorithm is a strategy chosen by the caller: anything that
//! implements [`ContentHasher`] can be threaded through
//! [`CacheEntry::store`](super::CacheEntry::store).

use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{PluginError, Result};

/// Incremental digest that renders its result as lowercase hex.
pub trait ContentHasher {
    /// Feed more content into the digest.
    fn update(&mut self, data: &[u8]) -> io::Result<()>;

    /// Finish the digest and render it as lowercase hex.
    fn finalize_hex(self: Box<Self>) -> String;
}

/// [`ContentHasher`] backed by a RustCrypto digest.
pub struct DigestHasher<D>(D);

impl<D: Digest> DigestHasher<D> {
    /// Create a hasher with a fresh digest state.
    pub fn new() -> Self {
        Self(D::new())
    }
}

impl<D: Digest> Default for DigestHasher<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest> ContentHasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) -> io::Result<()> {
        Digest::update(&mut self.0, data);
        Ok(())
    }

    fn finalize_hex(self: Box<Self>) -> String {
        let DigestHasher(state) = *self;
        let digest = state.finalize();
        hex::encode(&digest[..])
    }
}

/// Digest algorithms advertised by Data Flow and Skipper servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-256, preferred when the server advertises it.
    Sha256,
    /// SHA-1, the fallback.
    Sha1,
}

impl HashAlgorithm {
    /// Create a fresh hasher for this algorithm.
    pub fn hasher(self) -> Box<dyn ContentHasher> {
        match self {
            HashAlgorithm::Sha256 => Box::new(DigestHasher::<Sha256>::new()),
            HashAlgorithm::Sha1 => Box::new(DigestHasher::<Sha1>::new()),
        }
    }

    /// Get the string representation of this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha1 => "sha1",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes checksums of files on disk.
pub trait ChecksumCalculator {
    /// Stream the file at `path` through `hasher` and return the hex digest.
    fn calculate_checksum(&self, path: &Path, hasher: Box<dyn ContentHasher>) -> Result<String>;
}

/// [`ChecksumCalculator`] that reads straight from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileChecksumCalculator;

impl ChecksumCalculator for FileChecksumCalculator {
    fn calculate_checksum(&self, path: &Path, hasher: Box<dyn ContentHasher>) -> Result<String> {
        calculate_checksum(path, hasher)
    }
}

/// Stream the file at `path` through `hasher` and return the hex digest.
pub fn calculate_checksum(path: &Path, mut hasher: Box<dyn ContentHasher>) -> Result<String> {
    let mut file = File::open(path).map_err(|source| PluginError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    io::copy(&mut file, &mut HashWriter(hasher.as_mut()))?;

    Ok(hasher.finalize_hex())
}

/// Adapts a [`ContentHasher`] to `io::Write` so content can be streamed
/// with `io::copy`.
struct HashWriter<'a>(&'a mut dyn ContentHasher);

impl Write for HashWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
