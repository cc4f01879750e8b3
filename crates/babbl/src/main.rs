//! babbl CLI - markdown to standalone HTML.
//!
//! Provides commands for:
//! - `render`: Render one markdown file
//! - `build`: Render every matching file in a directory
//! - `clear-cache`: Drop all cache entries
//! - `info`: Show size and metadata of a markdown file

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, ClearCacheArgs, InfoArgs, RenderArgs};
use output::{Output, Tone};

/// babbl - turn markdown into standalone HTML documents.
#[derive(Parser)]
#[command(name = "babbl", version, about)]
struct Cli {
    /// Enable verbose logging (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown file to HTML.
    Render(RenderArgs),
    /// Render all markdown files in a directory.
    Build(BuildArgs),
    /// Clear the render cache.
    ClearCache(ClearCacheArgs),
    /// Show information about a markdown file.
    Info(InfoArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Build(args) => args.execute(&output),
        Commands::ClearCache(args) => args.execute(&output),
        Commands::Info(args) => args.execute(&output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.line(Tone::Fail, format_args!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use babbl_cache::CacheManager;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// A site with one page and a config keeping the cache in `cache/`.
    fn site() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("post.md"), "---\ntitle: Post\n---\n# Hi\n").unwrap();
        fs::write(
            tmp.path().join("babbl.toml"),
            "[render]\nhighlight = false\n\n[cache]\ndir = \"cache\"\n",
        )
        .unwrap();
        tmp
    }

    fn run(args: &[&str]) -> Result<(), error::CliError> {
        let cli = Cli::try_parse_from(std::iter::once("babbl").chain(args.iter().copied())).unwrap();
        let output = Output::new();
        match cli.command {
            Commands::Render(args) => args.execute(&output),
            Commands::Build(args) => args.execute(&output),
            Commands::ClearCache(args) => args.execute(&output),
            Commands::Info(args) => args.execute(&output),
        }
    }

    fn path(p: &Path) -> &str {
        p.to_str().unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_flags() {
        let cli = Cli::try_parse_from([
            "babbl", "render", "post.md", "-o", "out.html", "-f", "--clear-cache", "--no-highlight", "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Render(_)));
    }

    #[test]
    fn test_parse_build_defaults() {
        let cli = Cli::try_parse_from(["babbl", "build", "docs", "-r"]).unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("expected build command");
        };

        assert_eq!(args.pattern, "*.md");
        assert!(args.recursive);
    }

    #[test]
    fn test_parse_clear_cache_with_config() {
        let cli = Cli::try_parse_from(["babbl", "clear-cache", "-c", "site/babbl.toml"]).unwrap();
        assert!(matches!(cli.command, Commands::ClearCache(_)));
    }

    #[test]
    fn test_render_writes_page_and_cache() {
        let tmp = site();
        let config = tmp.path().join("babbl.toml");

        run(&["render", path(&tmp.path().join("post.md")), "-c", path(&config)]).unwrap();

        let html = fs::read_to_string(tmp.path().join("post.html")).unwrap();
        assert!(html.contains("<title>Post</title>"));
        assert_eq!(CacheManager::new(tmp.path().join("cache")).len(), 1);
    }

    #[test]
    fn test_clear_cache_empties_store() {
        let tmp = site();
        let config = tmp.path().join("babbl.toml");
        run(&["render", path(&tmp.path().join("post.md")), "-c", path(&config)]).unwrap();

        run(&["clear-cache", "-c", path(&config)]).unwrap();

        assert!(CacheManager::new(tmp.path().join("cache")).is_empty());
    }

    #[test]
    fn test_build_reports_without_failing() {
        let tmp = site();
        fs::write(tmp.path().join("broken.md"), [0xff, 0xfe]).unwrap();
        let out = tmp.path().join("out");

        run(&[
            "build",
            path(tmp.path()),
            "-o",
            path(&out),
            "--no-cache",
            "-c",
            path(&tmp.path().join("babbl.toml")),
        ])
        .unwrap();

        assert!(out.join("post.html").is_file());
        assert!(!out.join("broken.html").exists());
    }

    #[test]
    fn test_render_missing_input_is_error() {
        let tmp = site();

        let err = run(&["render", path(&tmp.path().join("missing.md"))]).unwrap_err();

        assert!(matches!(err, error::CliError::Validation(_)));
    }

    #[test]
    fn test_info_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();

        let err = run(&["info", path(&tmp.path().join("missing.md"))]).unwrap_err();

        assert!(matches!(err, error::CliError::Io(_)));
    }
}
