//! On-disk install layout.
//!
//! ```text
//! <bundles_dir>/plugins/
//! ├── plugin_identifiers.json
//! └── <language>/
//!     └── <plugin_name>/
//!         └── <version>/
//!             ├── <artifact-file>
//!             └── tmp/
//!                 └── disabled.txt   # present only while disabled
//! ```

use crate::error::{Result, StoreError};
use chrono::Utc;
use kpm_core::{Language, PLUGINS_DIR, RunContext};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory inside a version directory that holds the disabled marker.
pub const MARKER_DIR: &str = "tmp";

/// Disabled marker file name.
pub const DISABLED_MARKER: &str = "disabled.txt";

/// One installed version found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledVersion {
    /// Language subtree the version lives in
    pub language: Language,
    /// Plugin directory name
    pub plugin_name: String,
    /// Version directory name
    pub version: String,
    /// Absolute path of the version directory
    pub path: PathBuf,
    /// Whether the disabled marker is present
    pub disabled: bool,
}

/// Computes and manipulates `plugins/<language>/<plugin_name>/<version>/`.
#[derive(Debug, Clone)]
pub struct PluginDirectoryManager {
    plugins_dir: PathBuf,
}

impl PluginDirectoryManager {
    /// Creates a manager for the layout under `bundles_dir`.
    ///
    /// Does not touch the filesystem.
    #[must_use]
    pub fn new(bundles_dir: impl AsRef<Path>) -> Self {
        Self {
            plugins_dir: bundles_dir.as_ref().join(PLUGINS_DIR),
        }
    }

    /// Creates a manager for the context's bundles directory.
    #[must_use]
    pub fn from_context(ctx: &RunContext) -> Self {
        Self::new(ctx.bundles_dir())
    }

    /// `<bundles_dir>/plugins`
    #[must_use]
    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// Path of a version directory. Does not check that it exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidComponent`] if the plugin name or version
    /// is not a plain directory name.
    pub fn version_dir(&self, language: Language, plugin_name: &str, version: &str) -> Result<PathBuf> {
        validate_component("plugin name", plugin_name)?;
        validate_component("version", version)?;
        Ok(self
            .plugins_dir
            .join(language.as_str())
            .join(plugin_name)
            .join(version))
    }

    /// Creates the version directory and its parents. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if a component is invalid or creation fails.
    pub fn ensure_version_dir(
        &self,
        language: Language,
        plugin_name: &str,
        version: &str,
    ) -> Result<PathBuf> {
        let dir = self.version_dir(language, plugin_name, version)?;
        fs::create_dir_all(&dir)?;
        tracing::debug!("Ensured version directory: {}", dir.display());
        Ok(dir)
    }

    /// Writes artifact bytes into `dir`, replacing any existing file.
    ///
    /// The bytes go to a temporary file in the same directory first and are
    /// renamed into place, so a crash never leaves a truncated artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the file name is invalid or writing fails.
    pub fn write_artifact(&self, dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        validate_component("artifact file name", file_name)?;
        self.check_within(dir)?;

        let target = dir.join(file_name);
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(&target).map_err(|e| e.error)?;

        tracing::debug!("Wrote artifact {} ({} bytes)", target.display(), bytes.len());
        Ok(target)
    }

    /// Places the disabled marker. Re-disabling is a no-op.
    ///
    /// Returns whether the marker was newly created.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be written.
    pub fn mark_disabled(&self, version_dir: &Path) -> Result<bool> {
        self.check_within(version_dir)?;
        if self.is_disabled(version_dir) {
            tracing::debug!("Already disabled: {}", version_dir.display());
            return Ok(false);
        }

        let marker_dir = version_dir.join(MARKER_DIR);
        fs::create_dir_all(&marker_dir)?;
        fs::write(
            marker_dir.join(DISABLED_MARKER),
            format!("disabled at {}\n", Utc::now().to_rfc3339()),
        )?;

        tracing::info!("Disabled {}", version_dir.display());
        Ok(true)
    }

    /// Removes the disabled marker if present.
    ///
    /// Returns whether a marker was removed. The `tmp/` directory is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker exists but cannot be removed.
    pub fn mark_enabled(&self, version_dir: &Path) -> Result<bool> {
        self.check_within(version_dir)?;
        let marker = version_dir.join(MARKER_DIR).join(DISABLED_MARKER);
        match fs::remove_file(&marker) {
            Ok(()) => {
                tracing::info!("Re-enabled {}", version_dir.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns whether the disabled marker is present.
    #[must_use]
    pub fn is_disabled(&self, version_dir: &Path) -> bool {
        version_dir.starts_with(&self.plugins_dir)
            && version_dir.join(MARKER_DIR).join(DISABLED_MARKER).is_file()
    }

    fn check_within(&self, dir: &Path) -> Result<()> {
        if dir.starts_with(&self.plugins_dir) {
            Ok(())
        } else {
            Err(StoreError::InvalidComponent {
                kind: "version directory",
                value: dir.display().to_string(),
                reason: format!("not inside {}", self.plugins_dir.display()),
            })
        }
    }

    /// Lists every version directory on disk, enabled or not.
    ///
    /// Unknown language directories and hidden entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugins directory exists but cannot be read.
    pub fn scan(&self) -> Result<Vec<InstalledVersion>> {
        if !self.plugins_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        let walker = WalkDir::new(&self.plugins_dir)
            .min_depth(3)
            .max_depth(3)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !entry.file_name().to_string_lossy().starts_with('.'));

        for entry in walker {
            let entry = entry.map_err(|e| {
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory loop in plugins tree"))
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let Ok(relative) = path.strip_prefix(&self.plugins_dir) else {
                continue;
            };
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            let [language, plugin_name, version] = parts.as_slice() else {
                continue;
            };

            let Ok(language) = language.parse::<Language>() else {
                tracing::warn!("Skipping unknown language directory: {}", language);
                continue;
            };

            versions.push(InstalledVersion {
                language,
                plugin_name: plugin_name.clone(),
                version: version.clone(),
                path: path.to_path_buf(),
                disabled: self.is_disabled(path),
            });
        }

        Ok(versions)
    }
}

/// Validates that a value is safe to use as a single path component.
fn validate_component(kind: &'static str, value: &str) -> Result<()> {
    let reject = |reason: &str| {
        Err(StoreError::InvalidComponent {
            kind,
            value: value.to_string(),
            reason: reason.to_string(),
        })
    };

    if value.is_empty() {
        return reject("cannot be empty");
    }
    if value == "." || value == ".." {
        return reject("cannot be '.' or '..'");
    }
    if value.contains('/') || value.contains('\\') {
        return reject("cannot contain path separators");
    }
    if value.chars().any(char::is_control) {
        return reject("cannot contain control characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_version_dir_layout() {
        let manager = PluginDirectoryManager::new("/bundles");
        let dir = manager
            .version_dir(Language::Java, "analytics-plugin", "0.7.1")
            .unwrap();
        assert_eq!(dir, PathBuf::from("/bundles/plugins/java/analytics-plugin/0.7.1"));
    }

    #[test]
    fn test_validate_component() {
        assert!(validate_component("version", "1.0.0-SNAPSHOT").is_ok());
        assert!(validate_component("version", "").is_err());
        assert!(validate_component("version", "..").is_err());
        assert!(validate_component("plugin name", "a/b").is_err());
        assert!(validate_component("plugin name", "a\\b").is_err());
        assert!(validate_component("plugin name", "a\nb").is_err());
    }

    #[test]
    fn test_ensure_version_dir_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let manager = PluginDirectoryManager::new(temp.path());

        let first = manager.ensure_version_dir(Language::Java, "foo", "1.0").unwrap();
        let second = manager.ensure_version_dir(Language::Java, "foo", "1.0").unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
        assert!(!manager.version_dir(Language::Ruby, "foo", "1.0").unwrap().exists());
    }

    #[test]
    fn test_write_artifact_replaces_content() {
        let temp = TempDir::new().unwrap();
        let manager = PluginDirectoryManager::new(temp.path());
        let dir = manager.ensure_version_dir(Language::Java, "foo", "1.0").unwrap();

        manager.write_artifact(&dir, "foo-1.0.jar", b"old").unwrap();
        let path = manager.write_artifact(&dir, "foo-1.0.jar", b"new").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
    }

    #[test]
    fn test_disable_enable_cycle() {
        let temp = TempDir::new().unwrap();
        let manager = PluginDirectoryManager::new(temp.path());
        let dir = manager.ensure_version_dir(Language::Java, "foo", "1.0").unwrap();

        assert!(!manager.is_disabled(&dir));
        assert!(manager.mark_disabled(&dir).unwrap());
        assert!(manager.is_disabled(&dir));

        // Re-disabling is a no-op
        assert!(!manager.mark_disabled(&dir).unwrap());

        assert!(manager.mark_enabled(&dir).unwrap());
        assert!(!manager.is_disabled(&dir));
        assert!(!manager.mark_enabled(&dir).unwrap());
    }

    #[test]
    fn test_scan_reports_enable_state() {
        let temp = TempDir::new().unwrap();
        let manager = PluginDirectoryManager::new(temp.path());

        let enabled = manager.ensure_version_dir(Language::Java, "foo", "1.0").unwrap();
        let disabled = manager.ensure_version_dir(Language::Ruby, "bar", "2.0").unwrap();
        manager.mark_disabled(&disabled).unwrap();
        fs::create_dir_all(manager.plugins_dir().join("python/baz/1.0")).unwrap();
        fs::write(manager.plugins_dir().join("plugin_identifiers.json"), "{}").unwrap();

        let found = manager.scan().unwrap();
        assert_eq!(found.len(), 2);

        let foo = found.iter().find(|v| v.plugin_name == "foo").unwrap();
        assert_eq!(foo.path, enabled);
        assert!(!foo.disabled);

        let bar = found.iter().find(|v| v.plugin_name == "bar").unwrap();
        assert_eq!(bar.language, Language::Ruby);
        assert!(bar.disabled);
    }

    #[test]
    fn test_marker_outside_layout_rejected() {
        let temp = TempDir::new().unwrap();
        let manager = PluginDirectoryManager::new(temp.path().join("bundles"));

        let err = manager.mark_disabled(temp.path()).unwrap_err();
        assert!(err.is_recoverable());
        assert!(!temp.path().join(MARKER_DIR).exists());
    }

    #[test]
    fn test_scan_missing_plugins_dir() {
        let temp = TempDir::new().unwrap();
        let manager = PluginDirectoryManager::new(temp.path().join("absent"));
        assert!(manager.scan().unwrap().is_empty());
    }
}
