//! `babbl clear-cache` command implementation.

use std::path::PathBuf;

use babbl_cache::CacheManager;
use babbl_config::{CliSettings, Config};
use clap::Args;

use crate::error::CliError;
use crate::output::{Output, Tone};

/// Arguments for the clear-cache command.
#[derive(Args)]
pub(crate) struct ClearCacheArgs {
    /// Path to configuration file (default: auto-discover babbl.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache directory to clear (overrides config).
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

impl ClearCacheArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let settings = CliSettings {
            cache_dir: self.cache_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;

        let mut cache = CacheManager::new(&config.cache.dir);
        let removed = cache.len();
        cache.clear();

        output.line(Tone::Done, format_args!(
            "Cache cleared ({removed} entries): {}",
            config.cache.dir.display()
        ));
        Ok(())
    }
}
