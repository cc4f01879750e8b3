//! `babbl build` command implementation.

use std::path::PathBuf;

use babbl_build::{BatchBuilder, PageBuilder};
use clap::Args;

use super::RenderOptions;
use crate::error::CliError;
use crate::output::{Output, Tone};

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Directory containing markdown files.
    input_dir: PathBuf,

    /// Output directory (default: `<input_dir>/output`).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Glob pattern for source file names.
    #[arg(long, default_value = "*.md")]
    pub pattern: String,

    /// Search subdirectories too.
    #[arg(short, long)]
    pub recursive: bool,

    /// Render even if the cache is fresh.
    #[arg(short, long)]
    force: bool,

    #[command(flatten)]
    options: RenderOptions,
}

impl BuildArgs {
    /// Per-file failures are reported and do not fail the command.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        if !self.input_dir.is_dir() {
            return Err(CliError::Validation(format!(
                "Input directory not found: {}",
                self.input_dir.display()
            )));
        }

        let config = self.options.load_config()?;
        let output_dir = self
            .output_dir
            .unwrap_or_else(|| self.input_dir.join("output"));

        let mut builder = BatchBuilder::from(PageBuilder::from_config(&config)?);
        let reports = builder.build(
            &self.input_dir,
            &output_dir,
            &self.pattern,
            self.recursive,
            self.force,
        )?;

        if reports.is_empty() {
            output.line(Tone::Warn, format_args!(
                "No markdown files found matching pattern '{}'",
                self.pattern
            ));
            return Ok(());
        }

        output.line(Tone::Heading, format_args!("Processed {} markdown files", reports.len()));

        let mut failed = 0usize;
        for report in &reports {
            let name = report
                .source
                .strip_prefix(&self.input_dir)
                .unwrap_or(&report.source)
                .display();
            match &report.result {
                Ok(outcome) if outcome.skipped => {
                    output.line(Tone::Skipped, format_args!("- {name} (cached)"));
                }
                Ok(outcome) => {
                    output.line(Tone::Done, format_args!("✓ {name} → {}", outcome.output.display()));
                }
                Err(e) => {
                    failed += 1;
                    output.line(Tone::Fail, format_args!("✗ {name}: {e}"));
                }
            }
        }

        if failed > 0 {
            output.line(Tone::Warn, format_args!("{failed} of {} files failed", reports.len()));
        }
        output.line(Tone::Plain, format_args!(
            "Build complete! Output directory: {}",
            output_dir.display()
        ));
        Ok(())
    }
}
