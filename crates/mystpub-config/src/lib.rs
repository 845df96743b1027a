//! Configuration management for mystpub.
//!
//! Parses `mystpub.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.base_url`
//! - `confluence.token`
//! - `confluence.space_key`
//! - `confluence.parent_page_id`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override TOC description path.
    pub toc: Option<PathBuf>,
    /// Override base directory for TOC paths.
    pub source_dir: Option<PathBuf>,
    /// Override directory with pre-generated JSON ASTs.
    pub json_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mystpub.toml";

/// Default TOC description filename (MyST project file).
const DEFAULT_TOC: &str = "myst.yml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project configuration (paths are relative strings from TOML).
    project: ProjectConfigRaw,
    /// Parser configuration (paths are relative strings from TOML).
    parser: ParserConfigRaw,
    /// Confluence configuration.
    pub confluence: Option<ConfluenceConfig>,

    /// Resolved project configuration (set after loading).
    #[serde(skip)]
    pub project_resolved: ProjectConfig,
    /// Resolved parser configuration (set after loading).
    #[serde(skip)]
    pub parser_resolved: ParserConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw project configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ProjectConfigRaw {
    toc: Option<String>,
    source_dir: Option<String>,
}

/// Resolved project configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ProjectConfig {
    /// TOC description file (`myst.yml`).
    pub toc: PathBuf,
    /// Base directory that TOC `file` and `pattern` entries are relative to.
    pub source_dir: PathBuf,
}

/// Raw parser configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ParserConfigRaw {
    command: Option<Vec<String>>,
    json_dir: Option<String>,
}

/// Resolved parser configuration.
#[derive(Debug)]
pub struct ParserConfig {
    /// Parser command line; the source file path is appended.
    pub command: Vec<String>,
    /// Directory with pre-generated JSON ASTs. When set, no process is spawned.
    pub json_dir: Option<PathBuf>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            command: default_parser_command(),
            json_dir: None,
        }
    }
}

fn default_parser_command() -> Vec<String> {
    ["myst", "build", "--ast"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Confluence configuration.
#[derive(Debug, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence server base URL.
    pub base_url: String,
    /// Personal access token.
    pub token: String,
    /// Space that pages are published into.
    pub space_key: String,
    /// Page that root pages are created under.
    #[serde(default)]
    pub parent_page_id: Option<String>,
    /// Version message attached to page updates.
    #[serde(default = "default_version_message")]
    pub version_message: String,
}

fn default_version_message() -> String {
    "Published by mystpub".to_owned()
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.token, "confluence.token")?;
        require_non_empty(&self.space_key, "confluence.space_key")?;
        Ok(())
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
    EnvVar {
        /// Config field path (e.g., "`confluence.token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mystpub.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(toc) = &settings.toc {
            self.project_resolved.toc.clone_from(toc);
        }
        if let Some(source_dir) = &settings.source_dir {
            self.project_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(json_dir) = &settings.json_dir {
            self.parser_resolved.json_dir = Some(json_dir.clone());
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// Returns the Confluence config if the `[confluence]` section is present
    /// and all fields are valid.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation("[confluence] section required in config".into())
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            project: ProjectConfigRaw::default(),
            parser: ParserConfigRaw::default(),
            confluence: None,
            project_resolved: ProjectConfig {
                toc: base.join(DEFAULT_TOC),
                source_dir: base.to_path_buf(),
            },
            parser_resolved: ParserConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser_resolved.json_dir.is_none() && self.parser_resolved.command.is_empty() {
            return Err(ConfigError::Validation(
                "parser.command cannot be empty".to_owned(),
            ));
        }
        if let Some(confluence) = &self.confluence {
            confluence.validate()?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            confluence.token = expand::expand_env(&confluence.token, "confluence.token")?;
            confluence.space_key =
                expand::expand_env(&confluence.space_key, "confluence.space_key")?;
            if let Some(ref parent) = confluence.parent_page_id {
                confluence.parent_page_id =
                    Some(expand::expand_env(parent, "confluence.parent_page_id")?);
            }
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.project_resolved = ProjectConfig {
            toc: config_dir.join(self.project.toc.as_deref().unwrap_or(DEFAULT_TOC)),
            source_dir: config_dir.join(self.project.source_dir.as_deref().unwrap_or(".")),
        };

        self.parser_resolved = ParserConfig {
            command: self
                .parser
                .command
                .clone()
                .unwrap_or_else(default_parser_command),
            json_dir: self.parser.json_dir.as_deref().map(|d| config_dir.join(d)),
        };
    }
}
