//! Crash-safe document persistence shared by the checksum store and the
//! identifier registry.
//!
//! A document is always rewritten whole: it is serialized into a private
//! staging directory created next to the target (same filesystem), synced,
//! and renamed over the target. The staging directory is a [`TempDir`], so it
//! is removed on every exit path, including early returns on error.
//!
//! Writers in different processes are not coordinated; the last rename wins.
//!
//! [`TempDir`]: tempfile::TempDir

use crate::error::{Result, StoreError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Prefix of staging directories created during a write.
pub const STAGING_PREFIX: &str = ".kpm-staging-";

/// Reads and parses a JSON document.
///
/// Parse failures are reported as [`StoreError::Corrupt`].
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Replaces the file at `path` with the serialized `document`.
///
/// Creates missing parent directories.
pub(crate) fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| StoreError::InvalidComponent {
            kind: "store file",
            value: path.display().to_string(),
            reason: "path has no file name".to_string(),
        })?;

    fs::create_dir_all(parent)?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)?;
    let staged = staging.path().join(file_name);

    let bytes = serde_json::to_vec_pretty(document)?;
    {
        let mut file = File::create(&staged)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }

    if let Err(e) = fs::rename(&staged, path) {
        tracing::debug!(
            "Rename onto {} failed ({}), falling back to copy",
            path.display(),
            e
        );
        fs::copy(&staged, path)?;
    }

    if let Err(e) = staging.close() {
        tracing::warn!("Failed to remove staging directory: {}", e);
    }

    tracing::debug!("Persisted {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
