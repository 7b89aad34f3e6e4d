//! Layered configuration.
//!
//! Every setting is resolved through the same fixed chain:
//!
//! 1. explicit value (command-line flag or its environment variable)
//! 2. value from the TOML config file
//! 3. built-in default
//!
//! | Field         | Flag / env                              | Default             |
//! |---------------|-----------------------------------------|---------------------|
//! | `bundles_dir` | `--bundles-dir` / `KPM_BUNDLES_DIR`     | `/var/tmp/bundles`  |
//! | `repository`  | `--repository` / `KPM_REPOSITORY`       | `~/.m2/repository`  |
//! | `log_level`   | `--verbose` forces `debug`              | `info`              |
//! | `format`      | `--format`                              | `pretty`            |
//!
//! # Examples
//!
//! ```
//! use kpm_core::{ConfigFile, Overrides, Settings};
//! use std::path::PathBuf;
//!
//! let file = ConfigFile::parse("bundles_dir = \"/opt/bundles\"\nformat = \"json\"").unwrap();
//! let overrides = Overrides {
//!     bundles_dir: Some(PathBuf::from("/tmp/explicit")),
//!     ..Overrides::default()
//! };
//!
//! let settings = Settings::resolve(&overrides, &file).unwrap();
//! assert_eq!(settings.bundles_dir, PathBuf::from("/tmp/explicit"));
//! assert_eq!(settings.format.as_str(), "json");
//! assert_eq!(settings.log_level, "info");
//! ```

use crate::cli::OutputFormat;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default install root.
pub const DEFAULT_BUNDLES_DIR: &str = "/var/tmp/bundles";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Install root
    pub bundles_dir: Option<PathBuf>,
    /// Local Maven-layout repository to fetch artifacts from
    pub repository: Option<PathBuf>,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
    /// Default output format (json, text, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Default config location: `<config_dir>/kpm/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kpm").join("config.toml"))
    }

    /// Loads the config file at `path`.
    ///
    /// A missing file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the file exists but is not valid TOML
    /// or contains unknown fields, and [`Error::Io`] if it cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::ConfigError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses config content that did not come from a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the content is not valid.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigError {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })
    }
}

/// Values supplied explicitly for this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Install root
    pub bundles_dir: Option<PathBuf>,
    /// Artifact repository root
    pub repository: Option<PathBuf>,
    /// Logging level
    pub log_level: Option<String>,
    /// Output format
    pub format: Option<String>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Install root
    pub bundles_dir: PathBuf,
    /// Artifact repository root
    pub repository: PathBuf,
    /// Logging level directive for the log filter
    pub log_level: String,
    /// Output format
    pub format: OutputFormat,
}

impl Settings {
    /// Resolves each field through explicit > file > default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the winning `format` value is not
    /// a known output format.
    pub fn resolve(overrides: &Overrides, file: &ConfigFile) -> Result<Self> {
        let bundles_dir = pick(
            overrides.bundles_dir.clone(),
            file.bundles_dir.clone(),
            || PathBuf::from(DEFAULT_BUNDLES_DIR),
        );
        let repository = pick(
            overrides.repository.clone(),
            file.repository.clone(),
            default_repository,
        );
        let log_level = pick(
            overrides.log_level.clone(),
            file.log_level.clone(),
            || DEFAULT_LOG_LEVEL.to_string(),
        );
        let format = match overrides.format.as_ref().or(file.format.as_ref()) {
            Some(raw) => raw.parse::<OutputFormat>()?,
            None => OutputFormat::default(),
        };

        Ok(Self {
            bundles_dir,
            repository,
            log_level,
            format,
        })
    }
}

fn pick<T>(explicit: Option<T>, from_file: Option<T>, default: impl FnOnce() -> T) -> T {
    explicit.or(from_file).unwrap_or_else(default)
}

fn default_repository() -> PathBuf {
    dirs::home_dir().map_or_else(
        || PathBuf::from(".m2").join("repository"),
        |home| home.join(".m2").join("repository"),
    )
}
