//! Configuration management for babbl.
//!
//! Parses `babbl.toml` with serde and discovers it in the current directory
//! or any parent. Relative paths resolve against the directory holding the
//! config file. [`CliSettings`] override file values after loading.
//!
//! ```toml
//! [render]
//! highlight = true
//! theme = "InspiredGitHub"
//! css_file = "styles/site.css"
//!
//! [cache]
//! dir = ".babbl_cache"
//! enabled = true
//! ```
//!
//! ## Expansion
//!
//! `render.theme`, `render.css_file` and `cache.dir` support `${VAR}` and
//! `${VAR:-default}`. Path fields also expand a leading `~`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "babbl.toml";

/// Cache directory name used when `cache.dir` is not set.
const DEFAULT_CACHE_DIR: &str = ".babbl_cache";

/// CLI settings that override configuration file values.
///
/// Only `Some` fields override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub highlight: Option<bool>,
    pub theme: Option<String>,
    pub css_file: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub cache_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "render")]
    render_raw: RenderConfigRaw,
    #[serde(rename = "cache")]
    cache_raw: CacheConfigRaw,

    /// Resolved render settings (set after loading).
    #[serde(skip)]
    pub render: RenderConfig,
    /// Resolved cache settings (set after loading).
    #[serde(skip)]
    pub cache: CacheConfig,
    /// Path to the config file, if one was loaded.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RenderConfigRaw {
    highlight: Option<bool>,
    theme: Option<String>,
    css_file: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    dir: Option<String>,
    enabled: Option<bool>,
}

/// Rendering settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Whether fenced code is syntax-highlighted.
    pub highlight: bool,
    /// Highlighting theme name. `None` uses the renderer default.
    pub theme: Option<String>,
    /// Stylesheet replacing the bundled one.
    pub css_file: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            theme: None,
            css_file: None,
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Directory holding `cache.json`.
    pub dir: PathBuf,
    /// Whether the cache is consulted at all.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CACHE_DIR),
            enabled: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar { field: String, message: String },
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// Uses `config_path` when given (it must exist). Otherwise searches for
    /// `babbl.toml` from the current directory upward, falling back to
    /// defaults rooted at the current directory.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::load_from(&cwd, config_path, cli_settings)
    }

    /// Like [`Config::load`], but discovery starts at `start_dir`.
    pub fn load_from(
        start_dir: &Path,
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = discover_config(start_dir) {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_base(start_dir)
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(highlight) = settings.highlight {
            self.render.highlight = highlight;
        }
        if let Some(theme) = &settings.theme {
            self.render.theme = Some(theme.clone());
        }
        if let Some(css_file) = &settings.css_file {
            self.render.css_file = Some(css_file.clone());
        }
        if let Some(cache_dir) = &settings.cache_dir {
            self.cache.dir.clone_from(cache_dir);
        }
        if let Some(enabled) = settings.cache_enabled {
            self.cache.enabled = enabled;
        }
    }

    /// Defaults with the cache directory under `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            render_raw: RenderConfigRaw::default(),
            cache_raw: CacheConfigRaw::default(),
            render: RenderConfig::default(),
            cache: CacheConfig {
                dir: base.join(DEFAULT_CACHE_DIR),
                enabled: true,
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate resolved values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.theme.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Validation(
                "render.theme cannot be empty".to_owned(),
            ));
        }
        if self.cache.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "cache.dir cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let render = &mut self.render_raw;
        if let Some(theme) = &render.theme {
            render.theme = Some(expand::expand_env(theme, "render.theme")?);
        }
        if let Some(css_file) = &render.css_file {
            render.css_file = Some(expand::expand_path(css_file, "render.css_file")?);
        }
        if let Some(dir) = &self.cache_raw.dir {
            self.cache_raw.dir = Some(expand::expand_path(dir, "cache.dir")?);
        }
        Ok(())
    }

    /// Resolve raw values into settings, joining relative paths to `config_dir`.
    fn resolve(&mut self, config_dir: &Path) {
        self.render = RenderConfig {
            highlight: self.render_raw.highlight.unwrap_or(true),
            theme: self.render_raw.theme.clone(),
            css_file: self
                .render_raw
                .css_file
                .as_deref()
                .map(|f| config_dir.join(f)),
        };
        self.cache = CacheConfig {
            dir: config_dir.join(self.cache_raw.dir.as_deref().unwrap_or(DEFAULT_CACHE_DIR)),
            enabled: self.cache_raw.enabled.unwrap_or(true),
        };
    }
}

/// Search for `babbl.toml` in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.render.highlight);
        assert_eq!(config.render.theme, None);
        assert_eq!(config.render.css_file, None);
        assert_eq!(config.cache.dir, PathBuf::from("/test/.babbl_cache"));
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.render_raw.highlight.is_none());
        assert!(config.cache_raw.dir.is_none());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            r#"
[render]
highlight = false
theme = "base16-ocean.dark"
css_file = "styles/site.css"

[cache]
dir = "build/cache"
enabled = false
"#,
        );

        let config = Config::load_from(tmp.path(), Some(&path), None).unwrap();

        assert_eq!(
            config.render,
            RenderConfig {
                highlight: false,
                theme: Some("base16-ocean.dark".to_owned()),
                css_file: Some(tmp.path().join("styles/site.css")),
            }
        );
        assert_eq!(
            config.cache,
            CacheConfig {
                dir: tmp.path().join("build/cache"),
                enabled: false,
            }
        );
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_absolute_paths_kept() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "[cache]\ndir = \"/var/cache/babbl\"\n");

        let config = Config::load_from(tmp.path(), Some(&path), None).unwrap();

        assert_eq!(config.cache.dir, PathBuf::from("/var/cache/babbl"));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");

        let err = Config::load_from(tmp.path(), Some(&missing), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_discovers_config_in_parent() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "[render]\nhighlight = false\n");
        let nested = tmp.path().join("posts/2024");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Config::load_from(&nested, None, None).unwrap();

        assert!(!config.render.highlight);
        assert_eq!(config.cache.dir, tmp.path().join(".babbl_cache"));
    }

    #[test]
    fn test_no_config_uses_defaults_at_start_dir() {
        let tmp = TempDir::new().unwrap();

        let config = Config::load_from(tmp.path(), None, None).unwrap();

        assert!(config.config_path.is_none());
        assert_eq!(config.cache.dir, tmp.path().join(".babbl_cache"));
    }

    #[test]
    fn test_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "[render\n");

        let err = Config::load_from(tmp.path(), Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_theme_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "[render]\ntheme = \"\"\n");

        let err = Config::load_from(tmp.path(), Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("render.theme"));
    }

    #[test]
    fn test_env_expansion_in_cache_dir() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("BABBL_TEST_CACHE_ROOT", "/tmp/babbl-root");
        }
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "[cache]\ndir = \"${BABBL_TEST_CACHE_ROOT}/cache\"\n");

        let config = Config::load_from(tmp.path(), Some(&path), None).unwrap();

        assert_eq!(config.cache.dir, PathBuf::from("/tmp/babbl-root/cache"));
        unsafe {
            std::env::remove_var("BABBL_TEST_CACHE_ROOT");
        }
    }

    #[test]
    fn test_env_expansion_missing_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("BABBL_TEST_NO_THEME");
        }
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "[render]\ntheme = \"${BABBL_TEST_NO_THEME}\"\n");

        let err = Config::load_from(tmp.path(), Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings {
            highlight: Some(false),
            theme: Some("Solarized (dark)".to_owned()),
            css_file: Some(PathBuf::from("/styles/a.css")),
            cache_dir: Some(PathBuf::from("/other/cache")),
            cache_enabled: Some(false),
        });

        assert!(!config.render.highlight);
        assert_eq!(config.render.theme.as_deref(), Some("Solarized (dark)"));
        assert_eq!(config.render.css_file, Some(PathBuf::from("/styles/a.css")));
        assert_eq!(config.cache.dir, PathBuf::from("/other/cache"));
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());

        assert!(config.render.highlight);
        assert_eq!(config.cache.dir, PathBuf::from("/test/.babbl_cache"));
    }

    #[test]
    fn test_cli_settings_override_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "[render]\nhighlight = true\n");
        let settings = CliSettings {
            highlight: Some(false),
            ..CliSettings::default()
        };

        let config = Config::load_from(tmp.path(), Some(&path), Some(&settings)).unwrap();

        assert!(!config.render.highlight);
    }
}
