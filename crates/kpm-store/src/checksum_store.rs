//! Persistent mapping from artifact coordinate to trusted digest.

use crate::checksum::is_valid_digest;
use crate::error::{Result, StoreError};
use crate::persist::{read_document, write_document};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Coordinate string to lowercase hex SHA-1 digest.
pub type ChecksumRecord = BTreeMap<String, String>;

/// On-disk layout: a single top-level `sha1` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ChecksumDocument {
    #[serde(default)]
    sha1: ChecksumRecord,
}

/// Source of truth for which artifact bytes are trusted.
///
/// Every mutation rewrites the whole file through the crash-safe persistence
/// helper and then reloads it, so the in-memory view is always what is on
/// disk.
///
/// # File Format
///
/// ```json
/// {
///   "sha1": {
///     "org.kill-bill.billing.plugin.java:analytics-plugin:jar:0.7.1": "a9993e36..."
///   }
/// }
/// ```
///
/// # Examples
///
/// ```
/// use kpm_store::{ChecksumStore, compute_digest};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let temp = tempfile::tempdir()?;
/// let mut store = ChecksumStore::open(temp.path().join("sha1.json"))?;
/// let digest = compute_digest(b"foo 1.0.0");
///
/// store.upsert("org.example:foo:jar:1.0.0", digest.as_str())?;
/// assert_eq!(store.lookup("org.example:foo:jar:1.0.0"), Some(digest.as_str()));
///
/// store.remove("org.example:foo:jar:1.0.0")?;
/// assert_eq!(store.lookup("org.example:foo:jar:1.0.0"), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChecksumStore {
    path: PathBuf,
    document: ChecksumDocument,
}

impl ChecksumStore {
    /// Opens the store at `path`, initializing an empty one if the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the file exists but is not a valid
    /// document or holds a malformed digest, or an I/O error if it cannot be
    /// read or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            write_document(&path, &ChecksumDocument::default())?;
            tracing::info!("Initialized empty checksum store at {}", path.display());
        }

        let mut store = Self {
            path,
            document: ChecksumDocument::default(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Returns the trusted digest for a coordinate, if one is recorded.
    #[must_use]
    pub fn lookup(&self, coordinate: &str) -> Option<&str> {
        self.document.sha1.get(coordinate).map(String::as_str)
    }

    /// Read-only view of every recorded digest.
    #[must_use]
    pub const fn list(&self) -> &ChecksumRecord {
        &self.document.sha1
    }

    /// Records (or replaces) the digest for a coordinate and persists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDigest`] if `digest` is not lowercase hex
    /// SHA-1, or an error if persisting or reloading the file fails.
    pub fn upsert(&mut self, coordinate: impl Into<String>, digest: impl Into<String>) -> Result<()> {
        let coordinate = coordinate.into();
        let digest = digest.into();
        if !is_valid_digest(&digest) {
            return Err(StoreError::InvalidDigest { coordinate, digest });
        }

        tracing::debug!("Recording checksum for {}", coordinate);
        self.document.sha1.insert(coordinate, digest);
        self.save()
    }

    /// Drops the digest for a coordinate, if present, and persists.
    ///
    /// Returns whether an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting or reloading the file fails.
    pub fn remove(&mut self, coordinate: &str) -> Result<bool> {
        let removed = self.document.sha1.remove(coordinate).is_some();
        if removed {
            tracing::info!("Removed checksum for {}", coordinate);
        }
        self.save()?;
        Ok(removed)
    }

    /// Number of recorded digests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.document.sha1.len()
    }

    /// Returns true if no digest is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.sha1.is_empty()
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&mut self) -> Result<()> {
        write_document(&self.path, &self.document)?;
        self.reload()
    }

    fn reload(&mut self) -> Result<()> {
        let document: ChecksumDocument = read_document(&self.path)?;
        if let Some((coordinate, _)) = document
            .sha1
            .iter()
            .find(|(_, digest)| !is_valid_digest(digest))
        {
            return Err(StoreError::Corrupt {
                path: self.path.clone(),
                reason: format!("malformed digest for {coordinate}"),
            });
        }
        self.document = document;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::compute_digest;
    use std::fs;
    use tempfile::TempDir;

    const COORD: &str = "org.kill-bill.billing.plugin.java:analytics-plugin:jar:0.7.1";

    #[test]
    fn test_open_creates_file_and_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/sha1.json");

        let store = ChecksumStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(store.is_empty());

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["sha1"].is_object());
    }

    #[test]
    fn test_upsert_then_lookup() {
        let temp = TempDir::new().unwrap();
        let mut store = ChecksumStore::open(temp.path().join("sha1.json")).unwrap();

        let first = compute_digest(b"first");
        let second = compute_digest(b"second");

        store.upsert(COORD, first.as_str()).unwrap();
        assert_eq!(store.lookup(COORD), Some(first.as_str()));

        store.upsert(COORD, second.as_str()).unwrap();
        assert_eq!(store.lookup(COORD), Some(second.as_str()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_then_lookup() {
        let temp = TempDir::new().unwrap();
        let mut store = ChecksumStore::open(temp.path().join("sha1.json")).unwrap();

        store.upsert(COORD, compute_digest(b"jar")).unwrap();
        assert!(store.remove(COORD).unwrap());
        assert_eq!(store.lookup(COORD), None);

        // Removing again is not an error
        assert!(!store.remove(COORD).unwrap());
    }

    #[test]
    fn test_open_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sha1.json");
        fs::write(&path, "sha1:\n  - not json").unwrap();

        let err = ChecksumStore::open(&path).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_open_document_without_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sha1.json");
        fs::write(&path, "{}").unwrap();

        let store = ChecksumStore::open(&path).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_mutation_visible_to_fresh_handle() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sha1.json");

        let mut writer = ChecksumStore::open(&path).unwrap();
        let digest = compute_digest(b"jar");
        writer.upsert(COORD, digest.as_str()).unwrap();

        let reader = ChecksumStore::open(&path).unwrap();
        assert_eq!(reader.lookup(COORD), Some(digest.as_str()));
        assert_eq!(reader.list(), writer.list());
    }

    #[test]
    fn test_upsert_rejects_malformed_digest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sha1.json");
        let mut store = ChecksumStore::open(&path).unwrap();

        let err = store.upsert(COORD, "not-a-digest").unwrap_err();

        assert!(matches!(err, StoreError::InvalidDigest { .. }));
        assert!(store.is_empty());
        assert!(ChecksumStore::open(&path).unwrap().is_empty());
    }

    #[test]
    fn test_open_rejects_malformed_digest_on_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sha1.json");
        fs::write(&path, format!(r#"{{"sha1": {{"{COORD}": "ABC"}}}}"#)).unwrap();

        let err = ChecksumStore::open(&path).unwrap_err();
        assert!(err.is_corrupt());
    }
}
