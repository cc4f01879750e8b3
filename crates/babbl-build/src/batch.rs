//! Parallel directory builds.

use std::fs;
use std::path::{Path, PathBuf};

use babbl_cache::{CacheManager, CacheWriter};
use babbl_renderer::HtmlRenderer;
use rayon::prelude::*;

use crate::BuildError;
use crate::discover::discover;
use crate::page::{PageBuilder, RenderOutcome, fresh_output, write_page};

/// Outcome for one source file in a batch.
#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    pub result: Result<RenderOutcome, BuildError>,
}

/// Renders a directory of markdown files on the rayon thread pool.
///
/// Freshness checks read a snapshot of the cache taken at the start of the
/// build. Updates go through a [`CacheWriter`], which owns the live cache
/// until the build finishes.
pub struct BatchBuilder {
    renderer: HtmlRenderer,
    cache: Option<CacheManager>,
}

impl BatchBuilder {
    #[must_use]
    pub fn new(renderer: HtmlRenderer) -> Self {
        Self {
            renderer,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&CacheManager> {
        self.cache.as_ref()
    }

    /// Render every file in `input_dir` matching `pattern` into `output_dir`.
    ///
    /// Output paths mirror the source layout with an `.html` extension. A
    /// failing file is reported in its [`FileReport`] and never stops the
    /// others. Only discovery, output directory creation and a lost cache
    /// writer fail the whole build.
    pub fn build(
        &mut self,
        input_dir: &Path,
        output_dir: &Path,
        pattern: &str,
        recursive: bool,
        force: bool,
    ) -> Result<Vec<FileReport>, BuildError> {
        let sources = discover(input_dir, pattern, recursive)?;
        fs::create_dir_all(output_dir).map_err(BuildError::io(output_dir))?;

        if sources.is_empty() {
            return Ok(Vec::new());
        }
        tracing::info!(count = sources.len(), dir = %input_dir.display(), "Building pages");

        let snapshot = self.cache.clone();
        let writer = self.cache.take().map(CacheWriter::spawn);

        let reports: Vec<FileReport> = sources
            .par_iter()
            .map(|source| {
                let output = output_path(input_dir, output_dir, source);
                let result = self.build_one(snapshot.as_ref(), writer.as_ref(), source, &output, force);
                FileReport {
                    source: source.clone(),
                    result,
                }
            })
            .collect();

        if let Some(writer) = writer {
            self.cache = Some(writer.finish()?);
        }

        Ok(reports)
    }

    fn build_one(
        &self,
        snapshot: Option<&CacheManager>,
        writer: Option<&CacheWriter>,
        source: &Path,
        output: &Path,
        force: bool,
    ) -> Result<RenderOutcome, BuildError> {
        if !force
            && let Some(cache) = snapshot
            && let Some(cached) = fresh_output(cache, source)
        {
            return Ok(RenderOutcome {
                output: cached,
                skipped: true,
            });
        }

        let page = write_page(&self.renderer, source, output)?;

        if let Some(writer) = writer {
            writer.update(
                source.to_path_buf(),
                output.to_path_buf(),
                Some(page.content_hash),
                Some(page.metadata),
            )?;
        }

        Ok(RenderOutcome {
            output: output.to_path_buf(),
            skipped: false,
        })
    }
}

impl From<PageBuilder> for BatchBuilder {
    fn from(builder: PageBuilder) -> Self {
        let (renderer, cache) = builder.into_parts();
        Self { renderer, cache }
    }
}

/// `output_dir` joined with the source path relative to `input_dir`, as `.html`.
fn output_path(input_dir: &Path, output_dir: &Path, source: &Path) -> PathBuf {
    let relative = source
        .strip_prefix(input_dir)
        .ok()
        .or_else(|| source.file_name().map(Path::new))
        .unwrap_or(source);
    output_dir.join(relative).with_extension("html")
}
