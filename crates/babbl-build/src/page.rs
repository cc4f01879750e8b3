//! Single-page render pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use babbl_cache::CacheManager;
use babbl_config::{Config, RenderConfig};
use babbl_meta::{Frontmatter, process_file};
use babbl_renderer::{DEFAULT_THEME, HtmlRenderer, SyntectHighlighter};

use crate::BuildError;

/// Result of rendering one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Where the HTML lives. For a skipped file this is the cached path.
    pub output: PathBuf,
    /// Whether rendering was skipped because the cache was fresh.
    pub skipped: bool,
}

/// Build a renderer from render settings.
///
/// Fails on an unknown theme or an unreadable stylesheet.
pub fn build_renderer(settings: &RenderConfig) -> Result<HtmlRenderer, BuildError> {
    let mut renderer = HtmlRenderer::new();

    if settings.highlight {
        let theme = settings.theme.as_deref().unwrap_or(DEFAULT_THEME);
        renderer = renderer.with_highlighter(SyntectHighlighter::new(theme)?);
    }

    if let Some(css_file) = &settings.css_file {
        let css = fs::read_to_string(css_file).map_err(BuildError::io(css_file))?;
        renderer = renderer.with_css(css);
    }

    Ok(renderer)
}

/// Renders markdown files to standalone HTML documents.
pub struct PageBuilder {
    renderer: HtmlRenderer,
    cache: Option<CacheManager>,
}

impl PageBuilder {
    /// Builder without a cache; every file is rendered.
    #[must_use]
    pub fn new(renderer: HtmlRenderer) -> Self {
        Self {
            renderer,
            cache: None,
        }
    }

    /// Builder configured from `config`, with the cache opened if enabled.
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        let builder = Self::new(build_renderer(&config.render)?);
        Ok(if config.cache.enabled {
            builder.with_cache(CacheManager::new(&config.cache.dir))
        } else {
            builder
        })
    }

    #[must_use]
    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn renderer(&self) -> &HtmlRenderer {
        &self.renderer
    }

    pub fn cache(&self) -> Option<&CacheManager> {
        self.cache.as_ref()
    }

    pub fn cache_mut(&mut self) -> Option<&mut CacheManager> {
        self.cache.as_mut()
    }

    pub(crate) fn into_parts(self) -> (HtmlRenderer, Option<CacheManager>) {
        (self.renderer, self.cache)
    }

    /// Render markdown text (without frontmatter) into a full document.
    #[must_use]
    pub fn render_source(&self, text: &str, metadata: &Frontmatter) -> String {
        self.renderer.render_markdown(text, metadata)
    }

    /// Render `input` to `output`.
    ///
    /// Skips rendering when the cache says `input` is unchanged and its
    /// recorded output still exists, unless `force` is set.
    pub fn render_file(
        &mut self,
        input: &Path,
        output: &Path,
        force: bool,
    ) -> Result<RenderOutcome, BuildError> {
        if !force
            && let Some(cache) = &self.cache
            && let Some(cached) = fresh_output(cache, input)
        {
            return Ok(RenderOutcome {
                output: cached,
                skipped: true,
            });
        }

        let page = write_page(&self.renderer, input, output)?;

        if let Some(cache) = &mut self.cache
            && let Err(e) = cache.update(input, output, Some(page.content_hash), Some(page.metadata))
        {
            tracing::warn!("Rendered {} but could not cache it: {e}", input.display());
        }

        Ok(RenderOutcome {
            output: output.to_path_buf(),
            skipped: false,
        })
    }
}

/// A page written to disk, with what the cache records about it.
pub(crate) struct WrittenPage {
    pub content_hash: String,
    pub metadata: Frontmatter,
}

/// Recorded output for `input` if the source is unchanged and the file exists.
pub(crate) fn fresh_output(cache: &CacheManager, input: &Path) -> Option<PathBuf> {
    if cache.is_stale(input) {
        return None;
    }
    let cached = cache.cached_output_path(input)?;
    tracing::debug!(source = %input.display(), output = %cached.display(), "Using cached output");
    Some(cached)
}

/// Read, render and write one page, creating the output directory.
pub(crate) fn write_page(
    renderer: &HtmlRenderer,
    input: &Path,
    output: &Path,
) -> Result<WrittenPage, BuildError> {
    let source = process_file(input)?;
    let html = renderer.render_markdown(&source.body, &source.metadata);

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
    }
    fs::write(output, &html).map_err(BuildError::io(output))?;
    tracing::debug!(source = %input.display(), output = %output.display(), "Rendered page");

    Ok(WrittenPage {
        content_hash: CacheManager::content_hash(&html),
        metadata: source.metadata,
    })
}
