//! Configuration management for Hancock.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `hancock.toml` file
//! 3. User config `~/.config/hancock/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language selection and extra definitions.
    pub languages: LanguagesConfig,

    /// File scanning configuration.
    pub scan: ScanConfig,

    /// Output rendering configuration.
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./hancock.toml` (project local)
    /// 2. `~/.config/hancock/config.toml` (user config)
    /// 3. Falls back to defaults
    ///
    /// Environment overrides apply in every case.
    pub fn load() -> Result<Self, ConfigError> {
        // Try project-local config first
        if Path::new(PROJECT_CONFIG_FILE).exists() {
            return Self::from_file(PROJECT_CONFIG_FILE);
        }

        // Try user config
        if let Some(path) = Self::user_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides()?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse configuration text without consulting the environment.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `<config_dir>/hancock/config.toml`, if the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(language) = lookup("HANCOCK_LANGUAGE") {
            self.languages.default = language;
        }
        if let Some(dir) = lookup("HANCOCK_DEFINITIONS_DIR") {
            self.languages.definitions_dir = Some(PathBuf::from(dir));
        }
        if let Some(size) = lookup("HANCOCK_MAX_FILE_SIZE") {
            if let Ok(n) = size.parse() {
                self.scan.max_file_size = n;
            }
        }
        if let Some(format) = lookup("HANCOCK_OUTPUT_FORMAT") {
            self.output.format = format.parse()?;
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.languages.default.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "languages.default must not be empty".to_string(),
            ));
        }
        if self.scan.max_file_size == 0 {
            return Err(ConfigError::Invalid(
                "scan.max_file_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Language selection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagesConfig {
    /// Language used for files whose extension is not registered.
    pub default: String,

    /// Directory of extra language definition files (toml, yaml or json).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions_dir: Option<PathBuf>,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            default: DEFAULT_LANGUAGE.to_string(),
            definitions_dir: None,
        }
    }
}

/// File scanning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum size of a single file to scrape (in bytes).
    pub max_file_size: u64,

    /// Directories to exclude from scanning.
    pub exclude_dirs: Vec<String>,

    /// Honor `.gitignore` and related ignore files.
    pub follow_gitignore: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            follow_gitignore: DEFAULT_FOLLOW_GITIGNORE,
        }
    }
}

/// Output rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            pretty: DEFAULT_PRETTY_OUTPUT,
        }
    }
}

/// Serialization format for scrape results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(ConfigError::Invalid(format!(
                "unknown output format '{}' (expected json or yaml)",
                other
            ))),
        }
    }
}
