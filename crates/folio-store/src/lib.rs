//! Folio Storage Layer
//!
//! Implements the `ResultCache` trait as a content-addressed store.
//!
//! # Architecture
//!
//! - One flat directory, one file per entry: `{fingerprint}.{txt|csv|json}`
//! - No index file: the existence of a path is the existence check
//! - No eviction: every processed document and request keeps its entry
//! - Writes go to a temporary file in the same directory and are renamed
//!   into place, so a reader never sees a partially written entry
//!
//! `MemoryCache` offers the same contract without touching the disk.
//!
//! # Examples
//!
//! ```no_run
//! use folio_domain::traits::ResultCache;
//! use folio_domain::{EntryKind, Fingerprint};
//! use folio_store::FsCache;
//!
//! let cache = FsCache::open(".cache").unwrap();
//! let key = Fingerprint::of_bytes(b"%PDF-1.7 ...");
//! cache.put(EntryKind::Text, &key, "--- Page 1 Content ---\nHello\n\n").unwrap();
//! assert!(cache.contains(EntryKind::Text, &key).unwrap());
//! ```

#![warn(missing_docs)]

mod memory;

pub use memory::MemoryCache;

use folio_domain::traits::ResultCache;
use folio_domain::{EntryKind, Fingerprint};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Entry exists but is not valid UTF-8
    #[error("Invalid data in cache entry {0}")]
    InvalidData(PathBuf),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Number of entries per kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entry counts keyed by kind
    pub entries: HashMap<EntryKind, usize>,
    /// Total bytes across all entries
    pub total_bytes: u64,
}

impl CacheStats {
    /// Entry count for one kind
    pub fn count(&self, kind: EntryKind) -> usize {
        self.entries.get(&kind).copied().unwrap_or(0)
    }
}

/// Filesystem implementation of `ResultCache`
///
/// Cloning is cheap: a clone refers to the same directory.
#[derive(Debug, Clone)]
pub struct FsCache {
    dir: PathBuf,
}

impl FsCache {
    /// Open (creating if needed) a cache rooted at `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Cache root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for `(kind, key)`
    pub fn entry_path(&self, kind: EntryKind, key: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.{}", key.as_str(), kind.extension()))
    }

    /// Count entries per kind
    ///
    /// Only files named `{fingerprint}.{known extension}` are counted.
    pub fn stats(&self) -> Result<CacheStats, StoreError> {
        let mut stats = CacheStats::default();
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.dir, e))?;
            let path = entry.path();
            let kind = path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(EntryKind::from_extension);
            let is_key = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(|stem| Fingerprint::from_hex(stem).is_ok())
                .unwrap_or(false);

            if let (Some(kind), true) = (kind, is_key) {
                *stats.entries.entry(kind).or_insert(0) += 1;
                stats.total_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }
        Ok(stats)
    }
}

impl ResultCache for FsCache {
    type Error = StoreError;

    fn get(&self, kind: EntryKind, key: &Fingerprint) -> Result<Option<String>, Self::Error> {
        let path = self.entry_path(kind, key);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!("Cache hit: {}", path.display());
                String::from_utf8(bytes)
                    .map(Some)
                    .map_err(|_| StoreError::InvalidData(path))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    fn put(&self, kind: EntryKind, key: &Fingerprint, contents: &str) -> Result<(), Self::Error> {
        let path = self.entry_path(kind, key);

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        tmp.write_all(contents.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;

        debug!("Cache write: {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }

    fn contains(&self, kind: EntryKind, key: &Fingerprint) -> Result<bool, Self::Error> {
        Ok(self.entry_path(kind, key).is_file())
    }
}
