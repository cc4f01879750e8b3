//! Build pipeline for babbl.
//!
//! - [`PageBuilder`]: render one markdown file, consulting the cache
//! - [`BatchBuilder`]: render every matching file in a directory in parallel
//! - [`discover`]: find source files with a glob pattern

mod batch;
mod discover;
mod page;

use std::path::PathBuf;

use babbl_cache::CacheError;
use babbl_meta::MetaError;
use babbl_renderer::HighlightError;

pub use batch::{BatchBuilder, FileReport};
pub use discover::discover;
pub use page::{PageBuilder, RenderOutcome, build_renderer};

/// Error returned by the build pipeline.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Meta(#[from] MetaError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Invalid highlight theme: {0}")]
    Theme(#[from] HighlightError),

    #[error("Invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
