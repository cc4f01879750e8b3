//! Document metadata for babbl.
//!
//! Metadata comes from two places:
//!
//! - An inline frontmatter block at the top of the markdown file, delimited
//!   by `---` lines (see [`extract_frontmatter`]).
//! - A sidecar YAML file next to the markdown file with the same stem
//!   (`post.md` → `post.yaml` or `post.yml`, see [`load_sidecar`]).
//!
//! # Precedence
//!
//! [`merge_frontmatter`] combines both sources key by key. Inline values win;
//! the merge is shallow, so a nested mapping in the inline block replaces the
//! sidecar's mapping wholesale.
//!
//! # Example
//!
//! ```
//! use babbl_meta::{extract_frontmatter, merge_frontmatter};
//!
//! let (inline, body) = extract_frontmatter("---\ntitle: A\n---\n# Hello\n");
//! assert_eq!(body, "# Hello\n");
//!
//! let (sidecar, _) = extract_frontmatter("---\ntitle: B\nauthor: C\n---\n");
//! let merged = merge_frontmatter(inline, sidecar);
//! assert_eq!(merged["title"], "A");
//! assert_eq!(merged["author"], "C");
//! ```

mod frontmatter;
mod sidecar;

use std::path::{Path, PathBuf};

use serde_json::Value;

pub use frontmatter::extract_frontmatter;
pub use sidecar::{load_sidecar, sidecar_paths};

/// Metadata mapping from key to value, in document order.
pub type Frontmatter = serde_json::Map<String, Value>;

/// Error type for metadata operations.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// Markdown source could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A markdown source split into merged metadata and body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessedSource {
    /// Sidecar metadata overlaid with inline frontmatter.
    pub metadata: Frontmatter,
    /// Markdown content with the frontmatter block removed.
    pub body: String,
}

/// Merge inline and sidecar metadata.
///
/// Sidecar values are the defaults; inline values override them per key.
#[must_use]
pub fn merge_frontmatter(inline: Option<Frontmatter>, sidecar: Option<Frontmatter>) -> Frontmatter {
    let mut merged = sidecar.unwrap_or_default();
    for (key, value) in inline.into_iter().flatten() {
        merged.insert(key, value);
    }
    merged
}

/// Read a markdown file and resolve its metadata.
///
/// Inline frontmatter that fails to parse is treated as body text; only a
/// failure to read the markdown file itself is an error.
pub fn process_file(md_path: &Path) -> Result<ProcessedSource, MetaError> {
    let content = std::fs::read_to_string(md_path).map_err(|source| MetaError::Io {
        path: md_path.to_path_buf(),
        source,
    })?;

    let (inline, body) = extract_frontmatter(&content);
    let sidecar = load_sidecar(md_path);

    Ok(ProcessedSource {
        metadata: merge_frontmatter(inline, sidecar),
        body: body.to_owned(),
    })
}

/// Format a metadata value for display in HTML or terminal output.
///
/// Lists are joined with `", "`; nested mappings fall back to compact JSON.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}
