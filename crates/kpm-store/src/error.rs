//! Error types for store operations.

use std::path::PathBuf;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while loading, persisting, or laying out plugins.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Backing file exists but does not contain a valid document.
    ///
    /// A missing file is never reported this way; stores initialize empty
    /// state instead. This variant also surfaces a failed read-after-write
    /// check, where a just-persisted file cannot be parsed back.
    #[error("Corrupt store file {path}: {reason}")]
    Corrupt {
        /// File that failed to parse
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A path component (language, plugin name, version, file name) is not a
    /// plain directory entry name.
    ///
    /// Rejects empty names, `.`/`..`, separators, and control characters so a
    /// registry entry cannot point outside the plugins directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use kpm_store::{PluginDirectoryManager, StoreError};
    /// use kpm_core::Language;
    ///
    /// let manager = PluginDirectoryManager::new("/var/tmp/bundles");
    /// let err = manager.version_dir(Language::Java, "../escape", "1.0.0").unwrap_err();
    /// assert!(matches!(err, StoreError::InvalidComponent { .. }));
    /// ```
    #[error("Invalid {kind} '{value}': {reason}")]
    InvalidComponent {
        /// What the component names (e.g. "plugin name")
        kind: &'static str,
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// A digest is not lowercase hex of the expected length.
    #[error("Invalid digest '{digest}' for {coordinate}")]
    InvalidDigest {
        /// Coordinate the digest was recorded for
        coordinate: String,
        /// The rejected digest
        digest: String,
    },

    /// I/O error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error while writing a store document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if this error is caused by caller input rather than by
    /// the state of the filesystem.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidComponent { .. } | Self::InvalidDigest { .. })
    }

    /// Returns true if a backing file is unreadable as a document.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}
