//! `babbl render` command implementation.

use std::path::PathBuf;

use babbl_build::PageBuilder;
use babbl_cache::CacheManager;
use clap::Args;

use super::RenderOptions;
use crate::error::CliError;
use crate::output::{Output, Tone};

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    input: PathBuf,

    /// Output HTML file (default: input with `.html` extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render even if the cache is fresh.
    #[arg(short, long)]
    force: bool,

    /// Clear the cache before rendering.
    #[arg(long)]
    clear_cache: bool,

    #[command(flatten)]
    options: RenderOptions,
}

impl RenderArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        if !self.input.is_file() {
            return Err(CliError::Validation(format!(
                "Input file not found: {}",
                self.input.display()
            )));
        }

        let config = self.options.load_config()?;

        if self.clear_cache {
            CacheManager::new(&config.cache.dir).clear();
            output.line(Tone::Plain, "Cache cleared.");
        }

        let mut builder = PageBuilder::from_config(&config)?;
        let target = self
            .output
            .unwrap_or_else(|| self.input.with_extension("html"));

        let outcome = builder.render_file(&self.input, &target, self.force)?;

        if outcome.skipped {
            output.line(Tone::Plain, format_args!("Using cached output: {}", outcome.output.display()));
        } else {
            output.line(Tone::Done, format_args!("Rendered: {}", outcome.output.display()));
        }
        Ok(())
    }
}
