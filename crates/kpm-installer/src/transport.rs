//! Artifact transport contract and a local Maven-layout repository.

use crate::error::TransportError;
use kpm_core::{ArtifactCoordinate, ArtifactId};
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Source of artifact bytes and version listings.
///
/// Implementations are blocking; the installer performs at most one listing
/// per artifact identity and one fetch per install.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactTransport {
    /// Downloads the artifact at `coordinate`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Missing`] if nothing is published there.
    fn fetch(&self, coordinate: &ArtifactCoordinate) -> Result<Vec<u8>, TransportError>;

    /// Lists published versions of `id`, oldest first.
    ///
    /// An unknown artifact yields an empty list rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be read.
    fn list_versions(&self, id: &ArtifactId) -> Result<Vec<String>, TransportError>;
}

/// Read-only view over a directory in Maven repository layout.
///
/// ```text
/// <root>/org/kill-bill/billing/plugin/java/analytics-plugin/
/// └── 0.7.1/
///     └── analytics-plugin-0.7.1.jar
/// ```
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    /// Creates a repository rooted at `root`. The directory need not exist.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one subdirectory per published version of `id`.
    #[must_use]
    pub fn artifact_dir(&self, id: &ArtifactId) -> PathBuf {
        let mut dir = self.root.clone();
        dir.extend(id.group_id.split('.').filter(|part| !part.is_empty()));
        dir.push(&id.artifact_id);
        dir
    }

    /// Location of the artifact file for `coordinate`.
    #[must_use]
    pub fn artifact_path(&self, coordinate: &ArtifactCoordinate) -> PathBuf {
        self.artifact_dir(&coordinate.id)
            .join(&coordinate.version)
            .join(coordinate.file_name())
    }
}

impl ArtifactTransport for LocalRepository {
    fn fetch(&self, coordinate: &ArtifactCoordinate) -> Result<Vec<u8>, TransportError> {
        let path = self.artifact_path(coordinate);
        tracing::debug!("Reading {}", path.display());

        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(TransportError::Missing {
                coordinate: coordinate.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn list_versions(&self, id: &ArtifactId) -> Result<Vec<String>, TransportError> {
        let dir = self.artifact_dir(id);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(name) = file_name.to_str()
                && !name.starts_with('.')
            {
                versions.push(name.to_string());
            }
        }

        versions.sort_by(|a, b| compare_versions(a, b));
        tracing::debug!("{} lists {} version(s)", id, versions.len());
        Ok(versions)
    }
}

/// Orders version strings segment by segment.
///
/// Segments are split on `.` and `-`. Numeric segments compare numerically,
/// and a trailing qualifier (`1.0.0-SNAPSHOT`) sorts before the bare release.
///
/// # Examples
///
/// ```
/// use kpm_installer::compare_versions;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_versions("0.10.0", "0.9.3"), Ordering::Greater);
/// assert_eq!(compare_versions("1.0.0-SNAPSHOT", "1.0.0"), Ordering::Less);
/// ```
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split(['.', '-']);
    let mut right = b.split(['.', '-']);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (Some(extra), None) => return extra_segment_order(extra),
            (None, Some(extra)) => return extra_segment_order(extra).reverse(),
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    (Ok(_), Err(_)) => Ordering::Greater,
                    (Err(_), Ok(_)) => Ordering::Less,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Ordering of a version that has `extra` where the other one has ended.
fn extra_segment_order(extra: &str) -> Ordering {
    if extra.parse::<u64>().is_ok() {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}
