//! CLI command implementations.

mod build;
mod clear_cache;
mod info;
mod render;

use std::path::PathBuf;

use babbl_config::{CliSettings, Config};
use clap::Args;

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use clear_cache::ClearCacheArgs;
pub(crate) use info::InfoArgs;
pub(crate) use render::RenderArgs;

/// Options shared by commands that render pages.
#[derive(Args)]
pub(crate) struct RenderOptions {
    /// Path to configuration file (default: auto-discover babbl.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache directory (overrides config).
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Disable caching.
    #[arg(long)]
    no_cache: bool,

    /// Disable syntax highlighting.
    #[arg(long)]
    no_highlight: bool,

    /// Highlighting theme (overrides config).
    #[arg(long)]
    theme: Option<String>,

    /// Stylesheet replacing the bundled one.
    #[arg(long)]
    css: Option<PathBuf>,
}

impl RenderOptions {
    /// Load the config file with these options applied on top.
    fn load_config(self) -> Result<Config, CliError> {
        let settings = CliSettings {
            highlight: self.no_highlight.then_some(false),
            theme: self.theme,
            css_file: self.css,
            cache_dir: self.cache_dir,
            cache_enabled: self.no_cache.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        tracing::debug!(path = ?config.config_path, "Configuration loaded");
        Ok(config)
    }
}
