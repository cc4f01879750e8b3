//! Render cache for babbl.
//!
//! The cache remembers, per source file, the SHA-256 of its bytes and the
//! path of the HTML it was rendered to. A source is stale when it has no entry
//! or its current hash differs from the recorded one.
//!
//! - [`CacheManager`]: owns the store and answers staleness queries
//! - [`CacheWriter`]: single writer thread for parallel builds
//!
//! # Storage
//!
//! The whole store is one JSON document at `{cache_dir}/cache.json`, keyed by
//! canonical absolute source path. Every mutation rewrites the file through a
//! temporary file and an atomic rename. A missing or corrupt store loads as
//! empty; a failed write is logged and the in-memory state stays usable.
//!
//! # Example
//!
//! ```
//! use babbl_cache::CacheManager;
//!
//! let dir = tempfile::tempdir()?;
//! let source = dir.path().join("post.md");
//! let output = dir.path().join("post.html");
//! std::fs::write(&source, "# Hello")?;
//! std::fs::write(&output, "<h1>Hello</h1>")?;
//!
//! let mut cache = CacheManager::new(dir.path().join(".babbl_cache"));
//! assert!(cache.is_stale(&source));
//!
//! cache.update(&source, &output, None, None)?;
//! assert!(!cache.is_stale(&source));
//! assert_eq!(cache.cached_output_path(&source), Some(output));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod entry;
mod hash;
mod manager;
mod writer;

use std::path::PathBuf;

pub use entry::CacheEntry;
pub use hash::{hash_content, hash_file};
pub use manager::{CACHE_FILE, CacheManager, DEFAULT_CACHE_DIR};
pub use writer::{CacheCommand, CacheWriter};

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Source file could not be read for hashing.
    #[error("Failed to hash {}: {source}", path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The writer thread is gone.
    #[error("Cache writer stopped")]
    WriterStopped,
}
