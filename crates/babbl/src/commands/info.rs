//! `babbl info` command implementation.

use std::path::PathBuf;

use babbl_meta::{display_value, process_file};
use clap::Args;

use crate::error::CliError;
use crate::output::{Output, Tone};

/// Arguments for the info command.
#[derive(Args)]
pub(crate) struct InfoArgs {
    /// Markdown file to inspect.
    input: PathBuf,
}

impl InfoArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let size = std::fs::metadata(&self.input)?.len();
        let source = process_file(&self.input)?;

        output.line(Tone::Plain, format_args!("File: {}", self.input.display()));
        output.line(Tone::Plain, format_args!("Size: {size} bytes"));
        output.line(Tone::Plain, format_args!(
            "Content length: {} characters",
            source.body.chars().count()
        ));

        if source.metadata.is_empty() {
            output.line(Tone::Plain, "\nNo frontmatter found.");
        } else {
            output.line(Tone::Heading, "\nFrontmatter:");
            for (key, value) in &source.metadata {
                output.line(Tone::Plain, format_args!("  {key}: {}", display_value(value)));
            }
        }
        Ok(())
    }
}
