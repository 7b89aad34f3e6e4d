//! Error types shared across the KPM workspace.
//!
//! # Examples
//!
//! ```
//! use kpm_core::{Error, Result};
//!
//! fn require_key(key: &str) -> Result<()> {
//!     if key.is_empty() {
//!         return Err(Error::InvalidArgument("plugin key cannot be empty".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! let err = require_key("").unwrap_err();
//! assert!(err.is_invalid_argument());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    ///
    /// Raised when a configuration file exists but cannot be read or parsed,
    /// or when it contains contradictory settings.
    #[error("Configuration error in {path}: {message}")]
    ConfigError {
        /// Configuration file that failed to load
        path: PathBuf,
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid argument error.
    ///
    /// Raised when CLI arguments or function parameters are invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is an invalid argument error.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = Error::ConfigError {
            path: PathBuf::from("/etc/kpm/config.toml"),
            message: "expected a table".to_string(),
        };

        let display = err.to_string();
        assert!(display.contains("Configuration error"));
        assert!(display.contains("config.toml"));
        assert!(display.contains("expected a table"));
        assert!(err.is_config_error());
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_error.into();

        assert!(err.to_string().contains("denied"));
        assert!(!err.is_config_error());
    }
}
