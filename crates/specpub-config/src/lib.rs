//! Configuration management for specpub.
//!
//! Parses `specpub.toml` with serde and discovers it in the current
//! directory or its parents. Relative paths resolve against the directory
//! holding the config file.
//!
//! CLI settings are applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values support `${VAR}` (error when unset) and
//! `${VAR:-default}`. Expanded fields:
//! - `source.pages_dir`
//! - `source.macros_dir`
//! - `source.model`
//! - `output.dir`
//! - `terminology.server`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "specpub.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the page template directory.
    pub source_dir: Option<PathBuf>,
    /// Override the output directory.
    pub output_dir: Option<PathBuf>,
    /// Terminology server; enables online expansion when the file has none.
    pub tx_server: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    source: SourceConfigRaw,
    output: OutputConfigRaw,
    /// Expansion driver limits.
    pub expansion: ExpansionConfig,
    /// Terminology server (optional section). Expansion is offline without it.
    pub terminology: Option<TerminologyConfig>,

    /// Resolved paths (set after loading).
    #[serde(skip)]
    pub paths: PathsConfig,
    /// Path to the config file (set after loading).
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
struct SourceConfigRaw {
    pages_dir: Option<String>,
    macros_dir: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
}

/// Resolved input and output locations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    /// Page templates.
    pub pages_dir: PathBuf,
    /// Macro dictionary fragments (`*.html`).
    pub macros_dir: PathBuf,
    /// Specification model file (YAML or JSON).
    pub model: PathBuf,
    /// Where published pages are written.
    pub output_dir: PathBuf,
}

/// Limits and switches of the expansion driver.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Directive replacements allowed per expansion before it is a runaway.
    pub max_iterations: usize,
    /// Nesting limit for `include`.
    pub max_include_depth: usize,
    /// Number headings and register them as TOC sub-entries.
    pub post_pass: bool,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            max_include_depth: 8,
            post_pass: true,
        }
    }
}

/// Terminology server configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TerminologyConfig {
    /// Base URL of the FHIR terminology server.
    pub server: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Expansions larger than this are retried once without hierarchy and truncated.
    #[serde(default = "default_max_expansion_size")]
    pub max_expansion_size: usize,
}

impl TerminologyConfig {
    fn new(server: String) -> Self {
        Self {
            server,
            timeout_secs: default_timeout_secs(),
            max_expansion_size: default_max_expansion_size(),
        }
    }

    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate that the server URL and limits are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server, "terminology.server")?;
        require_http_url(&self.server, "terminology.server")?;
        reject_zero(self.timeout_secs == 0, "terminology.timeout_secs")?;
        reject_zero(self.max_expansion_size == 0, "terminology.max_expansion_size")?;
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_expansion_size() -> usize {
    1000
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
    EnvVar {
        /// Config field path (e.g., "`terminology.server`").
        field: String,
        /// Error message (e.g., "${`TX_SERVER`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn reject_zero(is_zero: bool, field: &str) -> Result<(), ConfigError> {
    if is_zero {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `specpub.toml` in the current directory and its parents, falling
    /// back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after path resolution and the result is
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing or
    /// env expansion fails, or a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.paths.pages_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.paths.output_dir.clone_from(output_dir);
        }
        if let Some(server) = &settings.tx_server {
            match &mut self.terminology {
                Some(terminology) => terminology.server.clone_from(server),
                None => self.terminology = Some(TerminologyConfig::new(server.clone())),
            }
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            source: SourceConfigRaw::default(),
            output: OutputConfigRaw::default(),
            expansion: ExpansionConfig::default(),
            terminology: None,
            paths: PathsConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        reject_zero(self.expansion.max_iterations == 0, "expansion.max_iterations")?;
        reject_zero(
            self.expansion.max_include_depth == 0,
            "expansion.max_include_depth",
        )?;
        if let Some(terminology) = &self.terminology {
            terminology.validate()?;
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let expand_opt = |value: &mut Option<String>, field: &str| -> Result<(), ConfigError> {
            if let Some(raw) = value.as_deref() {
                *value = Some(expand::expand_env(raw, field)?);
            }
            Ok(())
        };
        expand_opt(&mut self.source.pages_dir, "source.pages_dir")?;
        expand_opt(&mut self.source.macros_dir, "source.macros_dir")?;
        expand_opt(&mut self.source.model, "source.model")?;
        expand_opt(&mut self.output.dir, "output.dir")?;

        if let Some(ref mut terminology) = self.terminology {
            terminology.server = expand::expand_env(&terminology.server, "terminology.server")?;
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.paths = PathsConfig {
            pages_dir: resolve(self.source.pages_dir.as_deref(), "source"),
            macros_dir: resolve(self.source.macros_dir.as_deref(), "templates"),
            model: resolve(self.source.model.as_deref(), "model.yaml"),
            output_dir: resolve(self.output.dir.as_deref(), "publish"),
        };
    }
}
