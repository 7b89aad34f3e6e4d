//! Install and uninstall orchestration.

use crate::error::{InstallError, Result};
use crate::naming::derive_plugin_name_for_version;
use crate::resolver::{CoordinateResolver, PluginRequest, ResolvedPlugin};
use crate::transport::ArtifactTransport;
use kpm_core::{ArtifactCoordinate, PluginIdentifier, RunContext};
use kpm_store::{
    ChecksumStore, IdentifierRegistry, InstalledVersion, PluginDirectoryManager, compute_digest,
    constant_time_compare,
};
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPlugin {
    /// Registry key
    pub key: String,
    /// Registered metadata
    pub identifier: PluginIdentifier,
    /// Coordinate string used as the checksum key
    pub coordinate: String,
    /// Version directory
    pub path: PathBuf,
    /// Written artifact file
    pub artifact: PathBuf,
    /// Artifact size in bytes
    pub size: u64,
    /// Trusted digest
    pub checksum: String,
    /// Whether the digest was recorded by this install
    pub first_install: bool,
}

/// One registry entry disabled by an uninstall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UninstalledPlugin {
    /// Registry key that was removed
    pub key: String,
    /// Plugin name
    pub plugin_name: String,
    /// Disabled version
    pub version: String,
    /// Version directory, left on disk
    pub path: PathBuf,
}

/// Installed version as reported by [`Installer::inventory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    /// Registry key, if this version is the enabled one
    pub key: Option<String>,
    /// On-disk state
    #[serde(flatten)]
    pub installed: InstalledVersion,
}

/// Drives install and uninstall against one bundles directory.
///
/// Holds a single [`CoordinateResolver`], so version listings are fetched at
/// most once per installer.
///
/// # Examples
///
/// ```no_run
/// use kpm_core::{RunContext, VersionSpec};
/// use kpm_installer::{Installer, LocalRepository, PluginRequest};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = RunContext::new("/var/tmp/bundles");
/// let mut installer = Installer::new(ctx, LocalRepository::new("/root/.m2/repository"));
///
/// let installed = installer.install(&PluginRequest::new("analytics", VersionSpec::Latest))?;
/// println!("{} {}", installed.identifier.plugin_name, installed.identifier.version);
///
/// installer.uninstall("analytics", None)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Installer<T> {
    ctx: RunContext,
    transport: T,
    resolver: CoordinateResolver,
    layout: PluginDirectoryManager,
}

impl<T: ArtifactTransport> Installer<T> {
    /// Creates an installer for the bundles directory named by `ctx`.
    #[must_use]
    pub fn new(ctx: RunContext, transport: T) -> Self {
        let layout = PluginDirectoryManager::from_context(&ctx);
        Self {
            ctx,
            transport,
            resolver: CoordinateResolver::new(),
            layout,
        }
    }

    /// Run context.
    #[must_use]
    pub const fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Directory layout manager.
    #[must_use]
    pub const fn layout(&self) -> &PluginDirectoryManager {
        &self.layout
    }

    /// Resolves a request without fetching or touching disk.
    ///
    /// # Errors
    ///
    /// See [`CoordinateResolver::resolve`].
    pub fn resolve(&mut self, request: &PluginRequest) -> Result<ResolvedPlugin> {
        self.resolver.resolve(&self.transport, request)
    }

    /// Published versions of the artifact a request names, oldest first.
    ///
    /// The version in `request` is ignored.
    ///
    /// # Errors
    ///
    /// Returns a resolution error for an unresolvable identity, or a fetch
    /// error if listing fails.
    pub fn available_versions(&mut self, request: &PluginRequest) -> Result<Vec<String>> {
        let (id, _) = CoordinateResolver::resolve_id(request)?;
        Ok(self.resolver.list_versions(&self.transport, &id)?.to_vec())
    }

    /// Installs (or reinstalls) a plugin and enables it.
    ///
    /// Resolution happens before anything is fetched or written. A digest
    /// already on record must match the fetched bytes; otherwise the digest
    /// is recorded. Installing a different version under a registered key
    /// disables the previously registered version.
    ///
    /// If writing the artifact fails after the digest was recorded, the
    /// digest stays and the registry is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Resolution`], [`InstallError::Fetch`],
    /// [`InstallError::Integrity`], or [`InstallError::Store`] for the step
    /// that failed.
    pub fn install(&mut self, request: &PluginRequest) -> Result<InstalledPlugin> {
        let resolved = self.resolver.resolve(&self.transport, request)?;
        let coordinate = &resolved.coordinate;
        let plugin_name = derive_plugin_name_for_version(
            &coordinate.base_file_name(),
            &coordinate.version,
        )
        .ok_or_else(|| {
            InstallError::InvalidArgument(format!(
                "cannot derive a plugin name from '{}'",
                coordinate.base_file_name()
            ))
        })?;

        tracing::info!("Installing {} as '{}'", coordinate, resolved.key);

        let bytes = self
            .transport
            .fetch(coordinate)
            .map_err(|source| InstallError::Fetch {
                coordinate: coordinate.to_string(),
                source,
            })?;

        let (checksum, first_install) = self.verify_or_trust(coordinate, &bytes)?;

        let version_dir =
            self.layout
                .ensure_version_dir(resolved.language, &plugin_name, &coordinate.version)?;
        let artifact = self
            .layout
            .write_artifact(&version_dir, &coordinate.file_name(), &bytes)?;

        self.layout.mark_enabled(&version_dir)?;

        let identifier = PluginIdentifier {
            plugin_name,
            group_id: coordinate.id.group_id.clone(),
            artifact_id: coordinate.id.artifact_id.clone(),
            packaging: coordinate.id.packaging.clone(),
            version: coordinate.version.clone(),
            language: resolved.language,
        };

        let mut registry = IdentifierRegistry::load(self.ctx.registry_file())?;
        let previous = registry.put(resolved.key.clone(), identifier.clone())?;
        if let Some(previous) = previous {
            self.disable_replaced(&previous, &identifier)?;
        }

        tracing::info!(
            "Installed {} {} at {}",
            identifier.plugin_name,
            identifier.version,
            version_dir.display()
        );

        Ok(InstalledPlugin {
            key: resolved.key,
            coordinate: coordinate.to_string(),
            identifier,
            path: version_dir,
            artifact,
            size: bytes.len() as u64,
            checksum,
            first_install,
        })
    }

    /// Disables every registry entry matching `token` by key or plugin name.
    ///
    /// With `version`, only entries at that version are disabled. Artifact
    /// files are never deleted. Disabling an already-disabled directory is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::NotFound`] if nothing matches; the registry
    /// and the filesystem are left untouched in that case.
    pub fn uninstall(
        &mut self,
        token: &str,
        version: Option<&str>,
    ) -> Result<Vec<UninstalledPlugin>> {
        let not_found = || InstallError::NotFound {
            target: version.map_or_else(|| token.to_string(), |v| format!("{token} {v}")),
        };

        let Some(mut registry) = IdentifierRegistry::open_existing(self.ctx.registry_file())?
        else {
            return Err(not_found());
        };

        let matches: Vec<(String, PluginIdentifier)> = registry
            .find_by_key_or_name(token)
            .into_iter()
            .filter(|(_, identifier)| version.is_none_or(|v| identifier.version == v))
            .map(|(key, identifier)| (key.to_string(), identifier.clone()))
            .collect();

        if matches.is_empty() {
            return Err(not_found());
        }

        let mut disabled = Vec::with_capacity(matches.len());
        for (key, identifier) in matches {
            let version_dir = self.layout.version_dir(
                identifier.language,
                &identifier.plugin_name,
                &identifier.version,
            )?;
            if !version_dir.is_dir() {
                tracing::warn!(
                    "Version directory {} is missing; marking it disabled anyway",
                    version_dir.display()
                );
            }
            self.layout.mark_disabled(&version_dir)?;
            registry.remove(&key)?;

            tracing::info!(
                "Uninstalled {} {} ('{}')",
                identifier.plugin_name,
                identifier.version,
                key
            );
            disabled.push(UninstalledPlugin {
                key,
                plugin_name: identifier.plugin_name,
                version: identifier.version,
                path: version_dir,
            });
        }

        Ok(disabled)
    }

    /// Every version on disk, tagged with the registry key that enables it.
    ///
    /// Reads only; a missing bundles directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is corrupt or the tree cannot be
    /// read.
    pub fn inventory(&self) -> Result<Vec<InventoryEntry>> {
        let registry = IdentifierRegistry::open_existing(self.ctx.registry_file())?;

        let entries = self
            .layout
            .scan()?
            .into_iter()
            .map(|installed| {
                let key = registry.as_ref().and_then(|registry| {
                    registry
                        .iter()
                        .find(|(_, identifier)| {
                            identifier.language == installed.language
                                && identifier.plugin_name == installed.plugin_name
                                && identifier.version == installed.version
                        })
                        .map(|(key, _)| key.to_string())
                });
                InventoryEntry { key, installed }
            })
            .collect();

        Ok(entries)
    }

    /// Checks fetched bytes against the trusted digest, recording it if none
    /// exists yet. Returns the digest and whether it was newly recorded.
    fn verify_or_trust(
        &self,
        coordinate: &ArtifactCoordinate,
        bytes: &[u8],
    ) -> Result<(String, bool)> {
        let actual = compute_digest(bytes);
        let key = coordinate.to_string();
        let mut store = ChecksumStore::open(self.ctx.checksum_file())?;

        match store.lookup(&key).map(str::to_owned) {
            Some(expected) if constant_time_compare(&expected, &actual) => {
                tracing::debug!("Checksum verified for {}", key);
                Ok((actual, false))
            }
            Some(expected) => {
                tracing::warn!("Checksum mismatch for {}", key);
                Err(InstallError::Integrity {
                    coordinate: key,
                    expected,
                    actual,
                })
            }
            None => {
                tracing::info!("Trusting first download of {}", key);
                store.upsert(key, actual.clone())?;
                Ok((actual, true))
            }
        }
    }

    /// Disables the version a re-registered key pointed at, unless it is the
    /// one just installed.
    fn disable_replaced(
        &self,
        previous: &PluginIdentifier,
        current: &PluginIdentifier,
    ) -> Result<()> {
        if previous.language == current.language
            && previous.plugin_name == current.plugin_name
            && previous.version == current.version
        {
            return Ok(());
        }

        let previous_dir = self.layout.version_dir(
            previous.language,
            &previous.plugin_name,
            &previous.version,
        )?;
        if self.layout.mark_disabled(&previous_dir)? {
            tracing::info!(
                "Disabled {} {} in favour of {}",
                previous.plugin_name,
                previous.version,
                current.version
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::MockArtifactTransport;
    use kpm_core::VersionSpec;
    use tempfile::TempDir;

    fn exact(key: &str, version: &str) -> PluginRequest {
        PluginRequest::new(key, VersionSpec::Exact(version.to_string()))
    }

    #[test]
    fn test_unknown_key_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let bundles = temp.path().join("bundles");

        let mut transport = MockArtifactTransport::new();
        transport.expect_list_versions().never();
        transport.expect_fetch().never();

        let mut installer = Installer::new(RunContext::new(&bundles), transport);
        let err = installer
            .install(&PluginRequest::new("nope", VersionSpec::Latest))
            .unwrap_err();

        assert!(err.is_resolution_error());
        assert!(!bundles.exists());
    }

    #[test]
    fn test_fetch_failure_records_nothing() {
        let temp = TempDir::new().unwrap();
        let ctx = RunContext::new(temp.path().join("bundles"));

        let mut transport = MockArtifactTransport::new();
        transport.expect_fetch().times(1).returning(|coordinate| {
            Err(TransportError::Missing {
                coordinate: coordinate.to_string(),
            })
        });

        let mut installer = Installer::new(ctx.clone(), transport);
        let err = installer.install(&exact("stripe", "3.0.2")).unwrap_err();

        assert!(matches!(err, InstallError::Fetch { .. }));
        assert!(!ctx.checksum_file().exists());
        assert!(!ctx.registry_file().exists());
    }

    #[test]
    fn test_install_records_digest_and_registry() {
        let temp = TempDir::new().unwrap();
        let ctx = RunContext::new(temp.path().join("bundles"));

        let mut transport = MockArtifactTransport::new();
        transport
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(b"stripe jar".to_vec()));

        let mut installer = Installer::new(ctx.clone(), transport);
        let installed = installer.install(&exact("stripe", "3.0.2")).unwrap();

        assert_eq!(installed.identifier.plugin_name, "stripe-plugin");
        assert_eq!(installed.size, 10);
        assert!(installed.first_install);
        assert!(installed.artifact.ends_with("stripe-plugin-3.0.2.jar"));

        let store = ChecksumStore::open(ctx.checksum_file()).unwrap();
        assert_eq!(
            store.lookup(&installed.coordinate),
            Some(compute_digest(b"stripe jar").as_str())
        );

        let registry = IdentifierRegistry::load(ctx.registry_file()).unwrap();
        assert_eq!(registry.get("stripe"), Some(&installed.identifier));
    }

    #[test]
    fn test_uninstall_without_registry_is_not_found() {
        let temp = TempDir::new().unwrap();
        let ctx = RunContext::new(temp.path().join("bundles"));

        let mut installer = Installer::new(ctx.clone(), MockArtifactTransport::new());
        let err = installer.uninstall("stripe", Some("1.0.0")).unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("stripe 1.0.0"));
        assert!(!ctx.bundles_dir().exists());
    }

    #[test]
    fn test_inventory_on_empty_bundles() {
        let temp = TempDir::new().unwrap();
        let installer = Installer::new(
            RunContext::new(temp.path().join("bundles")),
            MockArtifactTransport::new(),
        );

        assert!(installer.inventory().unwrap().is_empty());
    }
}
