//! Sidecar metadata files.
//!
//! A sidecar lives next to the markdown file with the same stem and a YAML
//! extension. `.yaml` is checked before `.yml`.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::Frontmatter;

/// Candidate sidecar paths for a markdown file, in lookup order.
#[must_use]
pub fn sidecar_paths(md_path: &Path) -> [PathBuf; 2] {
    [md_path.with_extension("yaml"), md_path.with_extension("yml")]
}

/// Load the first usable sidecar for a markdown file.
///
/// Unreadable or unparsable candidates are logged and skipped.
#[must_use]
pub fn load_sidecar(md_path: &Path) -> Option<Frontmatter> {
    sidecar_paths(md_path)
        .iter()
        .filter(|path| path.is_file())
        .find_map(|path| read_sidecar(path))
}

fn read_sidecar(path: &Path) -> Option<Frontmatter> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read sidecar metadata");
            return None;
        }
    };

    let yaml: serde_yaml::Value = match serde_yaml::from_str(&content) {
        Ok(yaml) => yaml,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to parse sidecar metadata");
            return None;
        }
    };

    match serde_json::to_value(yaml) {
        Ok(Value::Object(map)) => Some(map),
        Ok(Value::Null) => Some(Frontmatter::new()),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Sidecar metadata is not a mapping");
            None
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Sidecar metadata has unsupported values");
            None
        }
    }
}
