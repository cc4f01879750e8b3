use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::BuildError;

/// Find files under `dir` whose names match `pattern`.
///
/// With `recursive`, subdirectories at any depth are searched too. Results
/// are sorted. Unreadable entries are logged and skipped.
pub fn discover(dir: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>, BuildError> {
    if !dir.is_dir() {
        return Err(BuildError::NotADirectory(dir.to_path_buf()));
    }

    let root = Pattern::escape(&dir.to_string_lossy());
    let full = if recursive {
        format!("{root}/**/{pattern}")
    } else {
        format!("{root}/{pattern}")
    };

    let entries = glob::glob(&full).map_err(|source| BuildError::Pattern {
        pattern: pattern.to_owned(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Skipping unreadable path: {e}");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    tracing::debug!(dir = %dir.display(), pattern, recursive, count = files.len(), "Discovered sources");
    Ok(files)
}
