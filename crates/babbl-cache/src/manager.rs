//! Cache store and staleness checks.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::CacheError;
use crate::entry::CacheEntry;
use crate::hash::{hash_content, hash_file};

/// Cache directory used when none is configured.
pub const DEFAULT_CACHE_DIR: &str = ".babbl_cache";

/// Store file name inside the cache directory.
pub const CACHE_FILE: &str = "cache.json";

/// Hash-based render cache backed by a single JSON file.
///
/// Cloning yields an independent in-memory snapshot. Only one instance should
/// mutate a given cache directory at a time; parallel builds route updates
/// through a [`CacheWriter`](crate::CacheWriter).
#[derive(Clone, Debug)]
pub struct CacheManager {
    cache_dir: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl CacheManager {
    /// Open the cache in `cache_dir`, loading any existing store.
    ///
    /// Never fails: a missing directory is created, and an unreadable or
    /// corrupt store is logged and replaced by an empty one.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            tracing::warn!(dir = %cache_dir.display(), error = %e, "Failed to create cache directory");
        }

        let entries = load_entries(&cache_dir.join(CACHE_FILE));
        tracing::debug!(dir = %cache_dir.display(), entries = entries.len(), "Cache loaded");

        Self { cache_dir, entries }
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the JSON store.
    #[must_use]
    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }

    /// Whether `source` needs rendering.
    ///
    /// True when there is no entry, the file cannot be read, or its bytes
    /// hash differently from the recorded hash.
    #[must_use]
    pub fn is_stale(&self, source: &Path) -> bool {
        let Some(entry) = self.entry(source) else {
            return true;
        };
        match hash_file(source) {
            Ok(hash) => hash != entry.source_hash,
            Err(e) => {
                tracing::debug!(path = %source.display(), error = %e, "Cannot hash source, treating as stale");
                true
            }
        }
    }

    /// Whether `content` differs from the content hash recorded for `source`.
    #[must_use]
    pub fn is_content_stale(&self, source: &Path, content: &str) -> bool {
        self.entry(source)
            .and_then(|entry| entry.content_hash.as_deref())
            .is_none_or(|recorded| recorded != hash_content(content))
    }

    /// Recorded output path for `source`, if that file still exists.
    #[must_use]
    pub fn cached_output_path(&self, source: &Path) -> Option<PathBuf> {
        self.entry(source)
            .map(|entry| entry.output_path.clone())
            .filter(|output| output.exists())
    }

    /// Record that `source` was rendered to `output`, then persist.
    ///
    /// Fails only if the source cannot be hashed. A failed persist is logged.
    pub fn update(
        &mut self,
        source: &Path,
        output: &Path,
        content_hash: Option<String>,
        metadata: Option<Map<String, Value>>,
    ) -> Result<(), CacheError> {
        let source_hash = hash_file(source).map_err(|e| CacheError::Hash {
            path: source.to_path_buf(),
            source: e,
        })?;

        let entry = CacheEntry {
            source_hash,
            output_path: output.to_path_buf(),
            last_processed: Local::now(),
            content_hash,
            metadata: metadata.filter(|m| !m.is_empty()),
        };
        self.entries.insert(cache_key(source), entry);
        self.persist();
        Ok(())
    }

    /// Drop every entry and persist.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
        tracing::info!(dir = %self.cache_dir.display(), "Cache cleared");
    }

    /// Drop the entry for `source`. Returns whether one existed.
    pub fn remove(&mut self, source: &Path) -> bool {
        let removed = self.entries.remove(&cache_key(source)).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    #[must_use]
    pub fn entry(&self, source: &Path) -> Option<&CacheEntry> {
        self.entries.get(&cache_key(source))
    }

    /// Iterate over `(key, entry)` pairs in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hash helper for callers recording a content hash.
    #[must_use]
    pub fn content_hash(content: &str) -> String {
        hash_content(content)
    }

    /// Write the whole store, replacing the previous file atomically.
    fn persist(&self) {
        if let Err(e) = self.write_store() {
            tracing::warn!(path = %self.cache_file().display(), error = %e, "Failed to save cache");
        }
    }

    fn write_store(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let tmp = NamedTempFile::new_in(&self.cache_dir)?;
        let mut writer = BufWriter::new(tmp);
        serde_json::to_writer_pretty(&mut writer, &self.entries)?;
        writer.flush()?;

        let tmp = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        tmp.persist(self.cache_file()).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Canonical absolute path string identifying a source.
///
/// Falls back to the lexically absolute path when the file does not exist.
fn cache_key(source: &Path) -> String {
    let path = fs::canonicalize(source)
        .or_else(|_| std::path::absolute(source))
        .unwrap_or_else(|_| source.to_path_buf());
    path.to_string_lossy().into_owned()
}

fn load_entries(path: &Path) -> BTreeMap<String, CacheEntry> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read cache, starting empty");
            return BTreeMap::new();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Corrupt cache, starting empty");
        BTreeMap::new()
    })
}
