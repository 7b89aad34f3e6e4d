//! Error types for install and uninstall operations.

use kpm_store::StoreError;

/// Result type for installer operations.
pub type Result<T> = std::result::Result<T, InstallError>;

/// Failure reported by an [`ArtifactTransport`](crate::ArtifactTransport).
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// The repository has no artifact at the requested coordinate.
    #[error("Artifact not available: {coordinate}")]
    Missing {
        /// Coordinate that was requested
        coordinate: String,
    },

    /// Reading from the repository failed.
    #[error("Repository I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while installing or uninstalling plugins.
#[derive(thiserror::Error, Debug)]
pub enum InstallError {
    /// The request could not be turned into a concrete coordinate.
    ///
    /// Raised for an unknown plugin key without explicit group and artifact,
    /// or when "latest" was requested and the repository lists no versions.
    /// Nothing on disk has been touched when this is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use kpm_core::{RunContext, VersionSpec};
    /// use kpm_installer::{InstallError, Installer, LocalRepository, PluginRequest};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let temp = tempfile::tempdir()?;
    /// let ctx = RunContext::new(temp.path().join("bundles"));
    /// let mut installer = Installer::new(ctx, LocalRepository::new(temp.path().join("repo")));
    ///
    /// let result = installer.install(&PluginRequest::new("no-such-plugin", VersionSpec::Latest));
    /// assert!(matches!(result, Err(InstallError::Resolution { .. })));
    /// # Ok(())
    /// # }
    /// ```
    #[error("Cannot resolve '{key}': {reason}")]
    Resolution {
        /// Plugin key or artifact identity being resolved
        key: String,
        /// Why resolution failed
        reason: String,
    },

    /// The transport failed to list or fetch an artifact.
    #[error("Failed to fetch {coordinate}: {source}")]
    Fetch {
        /// Coordinate (or versionless identity) being fetched
        coordinate: String,
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// Downloaded bytes do not match the trusted digest.
    ///
    /// # Security
    ///
    /// The stored digest is never replaced by the new one. Drop it explicitly
    /// (`kpm checksum remove`) to trust a republished artifact.
    #[error("Integrity check failed for {coordinate}: expected {expected}, got {actual}")]
    Integrity {
        /// Coordinate whose digest differs
        coordinate: String,
        /// Digest recorded on first install
        expected: String,
        /// Digest of the bytes just fetched
        actual: String,
    },

    /// No registry entry matches the uninstall target.
    #[error("No enabled plugin matches '{target}'")]
    NotFound {
        /// Key or name (with version filter, if any) that matched nothing
        target: String,
    },

    /// Persistent state could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed request.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl InstallError {
    /// Returns `true` for failures caused by the request itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use kpm_installer::InstallError;
    ///
    /// let err = InstallError::NotFound { target: "stripe".into() };
    /// assert!(err.is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Resolution { .. } | Self::NotFound { .. } | Self::InvalidArgument(_)
        )
    }

    /// Returns `true` if this is a not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is an integrity error.
    #[must_use]
    pub const fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }

    /// Returns `true` if this is a resolution error.
    #[must_use]
    pub const fn is_resolution_error(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}
