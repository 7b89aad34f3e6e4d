//! Persistent registry of enabled plugins.

use crate::error::Result;
use crate::persist::{read_document, write_document};
use kpm_core::PluginIdentifier;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Maps plugin keys to the metadata of the enabled installation.
///
/// Absence of a key means the plugin is disabled or was never installed; it
/// says nothing about what is on disk. Every mutation is followed by a full
/// persist-and-reload cycle before it returns.
///
/// # File Format
///
/// ```json
/// {
///   "analytics": {
///     "plugin_name": "analytics-plugin",
///     "group_id": "org.kill-bill.billing.plugin.java",
///     "artifact_id": "analytics-plugin",
///     "packaging": "jar",
///     "version": "0.7.1",
///     "language": "java"
///   }
/// }
/// ```
#[derive(Debug)]
pub struct IdentifierRegistry {
    path: PathBuf,
    entries: BTreeMap<String, PluginIdentifier>,
}

impl IdentifierRegistry {
    /// Loads the registry at `path`, initializing an empty one if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`](crate::StoreError::Corrupt) if the file
    /// exists but is not a valid registry document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            write_document(&path, &BTreeMap::<String, PluginIdentifier>::new())?;
            tracing::info!("Initialized empty plugin registry at {}", path.display());
        }

        let entries = read_document(&path)?;
        Ok(Self { path, entries })
    }

    /// Loads the registry only if its backing file already exists.
    ///
    /// Read-only callers use this to avoid creating the file as a side
    /// effect.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`](crate::StoreError::Corrupt) if the file
    /// exists but is not a valid registry document.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Rewrites the backing file from memory and reloads it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or the written file does not parse
    /// back.
    pub fn save(&mut self) -> Result<()> {
        write_document(&self.path, &self.entries)?;
        self.entries = read_document(&self.path)?;
        Ok(())
    }

    /// Registers (or replaces) a plugin and persists.
    ///
    /// Returns the entry previously stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        identifier: PluginIdentifier,
    ) -> Result<Option<PluginIdentifier>> {
        let key = key.into();
        tracing::debug!(
            "Registering {} -> {} {}",
            key,
            identifier.plugin_name,
            identifier.version
        );
        let previous = self.entries.insert(key, identifier);
        self.save()?;
        Ok(previous)
    }

    /// Unregisters a plugin, if present, and persists.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn remove(&mut self, key: &str) -> Result<Option<PluginIdentifier>> {
        let removed = self.entries.remove(key);
        self.save()?;
        Ok(removed)
    }

    /// Entry registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PluginIdentifier> {
        self.entries.get(key)
    }

    /// Entries whose key equals `token` or whose `plugin_name` equals
    /// `token`.
    ///
    /// This lets a plugin be addressed by its user-facing key or by the name
    /// derived from its artifact.
    ///
    /// # Examples
    ///
    /// ```
    /// use kpm_core::{Language, PluginIdentifier};
    /// use kpm_store::IdentifierRegistry;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let temp = tempfile::tempdir()?;
    /// let mut registry = IdentifierRegistry::load(temp.path().join("plugin_identifiers.json"))?;
    /// registry.put("analytics", PluginIdentifier {
    ///     plugin_name: "analytics-plugin".to_string(),
    ///     group_id: "org.kill-bill.billing.plugin.java".to_string(),
    ///     artifact_id: "analytics-plugin".to_string(),
    ///     packaging: "jar".to_string(),
    ///     version: "0.7.1".to_string(),
    ///     language: Language::Java,
    /// })?;
    ///
    /// assert_eq!(registry.find_by_key_or_name("analytics").len(), 1);
    /// assert_eq!(registry.find_by_key_or_name("analytics-plugin").len(), 1);
    /// assert!(registry.find_by_key_or_name("stripe").is_empty());
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn find_by_key_or_name(&self, token: &str) -> Vec<(&str, &PluginIdentifier)> {
        self.entries
            .iter()
            .filter(|(key, identifier)| key.as_str() == token || identifier.plugin_name == token)
            .map(|(key, identifier)| (key.as_str(), identifier))
            .collect()
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PluginIdentifier)> {
        self.entries
            .iter()
            .map(|(key, identifier)| (key.as_str(), identifier))
    }

    /// Number of enabled plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plugin is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
