//! End-to-end install/uninstall tests against a local repository.

use kpm_core::{RunContext, VersionSpec};
use kpm_installer::{InstallError, Installer, LocalRepository, PluginRequest};
use kpm_store::{ChecksumStore, IdentifierRegistry, PluginDirectoryManager};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ANALYTICS_DIR: &str = "org/kill-bill/billing/plugin/java/analytics-plugin";

struct Fixture {
    _temp: TempDir,
    repo: PathBuf,
    ctx: RunContext,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repository");
        let ctx = RunContext::new(temp.path().join("bundles"));
        Self {
            _temp: temp,
            repo,
            ctx,
        }
    }

    fn publish_analytics(&self, version: &str, bytes: &[u8]) -> PathBuf {
        let dir = self.repo.join(ANALYTICS_DIR).join(version);
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join(format!("analytics-plugin-{version}.jar"));
        fs::write(&file, bytes).unwrap();
        file
    }

    fn installer(&self) -> Installer<LocalRepository> {
        Installer::new(self.ctx.clone(), LocalRepository::new(&self.repo))
    }

    fn version_dir(&self, version: &str) -> PathBuf {
        self.ctx
            .plugins_dir()
            .join("java/analytics-plugin")
            .join(version)
    }

    fn registry(&self) -> IdentifierRegistry {
        IdentifierRegistry::load(self.ctx.registry_file()).unwrap()
    }

    fn is_disabled(&self, dir: &Path) -> bool {
        PluginDirectoryManager::from_context(&self.ctx).is_disabled(dir)
    }
}

fn analytics(version: &str) -> PluginRequest {
    PluginRequest::new("analytics", VersionSpec::Exact(version.to_string()))
}

fn install_then_uninstall_by(token: &str) {
    let fixture = Fixture::new();
    fixture.publish_analytics("0.7.1", b"analytics 0.7.1");
    let mut installer = fixture.installer();

    let installed = installer.install(&analytics("0.7.1")).unwrap();
    assert_eq!(installed.identifier.plugin_name, "analytics-plugin");
    assert_eq!(installed.path, fixture.version_dir("0.7.1"));
    assert_eq!(fixture.registry().len(), 1);

    let removed = installer.uninstall(token, None).unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].key, "analytics");

    let version_dir = fixture.version_dir("0.7.1");
    assert!(fixture.registry().is_empty());
    assert!(version_dir.join("tmp/disabled.txt").is_file());
    assert!(version_dir.join("analytics-plugin-0.7.1.jar").is_file());
}

#[test]
fn test_install_and_uninstall_by_key() {
    install_then_uninstall_by("analytics");
}

#[test]
fn test_install_and_uninstall_by_plugin_name() {
    install_then_uninstall_by("analytics-plugin");
}

#[test]
fn test_unknown_key_fails_before_any_mutation() {
    let fixture = Fixture::new();
    fixture.publish_analytics("0.7.1", b"bytes");
    let mut installer = fixture.installer();

    let err = installer
        .install(&PluginRequest::new("does-not-exist", VersionSpec::Latest))
        .unwrap_err();

    assert!(matches!(err, InstallError::Resolution { .. }));
    assert!(!fixture.ctx.bundles_dir().exists());
}

#[test]
fn test_reinstall_disabled_version_reenables_it() {
    let fixture = Fixture::new();
    fixture.publish_analytics("0.7.1", b"analytics 0.7.1");
    let mut installer = fixture.installer();

    installer.install(&analytics("0.7.1")).unwrap();
    installer.uninstall("analytics", None).unwrap();
    assert!(fixture.is_disabled(&fixture.version_dir("0.7.1")));

    let reinstalled = installer.install(&analytics("0.7.1")).unwrap();

    assert!(!reinstalled.first_install);
    assert!(!fixture.is_disabled(&fixture.version_dir("0.7.1")));
    assert_eq!(
        fixture.registry().get("analytics").map(|id| id.version.as_str()),
        Some("0.7.1")
    );
}

#[test]
fn test_uninstall_nonexistent_key_changes_nothing() {
    let fixture = Fixture::new();
    fixture.publish_analytics("0.7.1", b"analytics 0.7.1");
    let mut installer = fixture.installer();
    installer.install(&analytics("0.7.1")).unwrap();

    let registry_before = fs::read(fixture.ctx.registry_file()).unwrap();

    let err = installer.uninstall("stripe", None).unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(fs::read(fixture.ctx.registry_file()).unwrap(), registry_before);
    assert!(!fixture.is_disabled(&fixture.version_dir("0.7.1")));
}

#[test]
fn test_uninstall_with_other_version_is_not_found() {
    let fixture = Fixture::new();
    fixture.publish_analytics("0.7.1", b"analytics 0.7.1");
    let mut installer = fixture.installer();
    installer.install(&analytics("0.7.1")).unwrap();

    let err = installer.uninstall("analytics", Some("0.6.0")).unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(fixture.registry().len(), 1);

    let removed = installer.uninstall("analytics", Some("0.7.1")).unwrap();
    assert_eq!(removed[0].version, "0.7.1");
}

#[test]
fn test_latest_picks_newest_published_version() {
    let fixture = Fixture::new();
    fixture.publish_analytics("0.6.0", b"old");
    fixture.publish_analytics("0.10.2", b"newest");
    fixture.publish_analytics("0.7.1", b"middle");
    let mut installer = fixture.installer();

    let installed = installer
        .install(&PluginRequest::new("analytics", VersionSpec::Latest))
        .unwrap();

    assert_eq!(installed.identifier.version, "0.10.2");
    assert_eq!(
        installer
            .available_versions(&PluginRequest::new("analytics", VersionSpec::Latest))
            .unwrap(),
        vec!["0.6.0", "0.7.1", "0.10.2"]
    );
}

#[test]
fn test_latest_without_published_versions() {
    let fixture = Fixture::new();
    let mut installer = fixture.installer();

    let err = installer
        .install(&PluginRequest::new("analytics", VersionSpec::Latest))
        .unwrap_err();

    assert!(err.is_resolution_error());
    assert!(!fixture.ctx.bundles_dir().exists());
}

#[test]
fn test_tampered_artifact_fails_integrity() {
    let fixture = Fixture::new();
    let published = fixture.publish_analytics("0.7.1", b"original bytes");
    let mut installer = fixture.installer();
    let first = installer.install(&analytics("0.7.1")).unwrap();

    fs::write(&published, b"tampered bytes").unwrap();
    let err = installer.install(&analytics("0.7.1")).unwrap_err();

    let InstallError::Integrity {
        expected, actual, ..
    } = err
    else {
        panic!("expected an integrity error");
    };
    assert_eq!(expected, first.checksum);
    assert_ne!(actual, first.checksum);

    let store = ChecksumStore::open(fixture.ctx.checksum_file()).unwrap();
    assert_eq!(store.lookup(&first.coordinate), Some(first.checksum.as_str()));
}

#[test]
fn test_upgrade_disables_previous_version() {
    let fixture = Fixture::new();
    fixture.publish_analytics("0.7.0", b"v0.7.0");
    fixture.publish_analytics("0.7.1", b"v0.7.1");
    let mut installer = fixture.installer();

    installer.install(&analytics("0.7.0")).unwrap();
    installer.install(&analytics("0.7.1")).unwrap();

    assert!(fixture.is_disabled(&fixture.version_dir("0.7.0")));
    assert!(!fixture.is_disabled(&fixture.version_dir("0.7.1")));

    let registry = fixture.registry();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("analytics").unwrap().version, "0.7.1");

    let inventory = installer.inventory().unwrap();
    assert_eq!(inventory.len(), 2);
    let enabled: Vec<_> = inventory.iter().filter(|e| e.key.is_some()).collect();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].installed.version, "0.7.1");
    assert!(!enabled[0].installed.disabled);
}

#[test]
fn test_explicit_coordinates_install_ruby_tarball() {
    let fixture = Fixture::new();
    let dir = fixture.repo.join("com/acme/acme-tax/2.1.0");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("acme-tax-2.1.0.tar.gz"), b"tarball").unwrap();
    let mut installer = fixture.installer();

    let request = PluginRequest::new("acme", VersionSpec::Latest)
        .with_coordinates("com.acme", "acme-tax")
        .with_packaging("tar.gz");
    let installed = installer.install(&request).unwrap();

    assert_eq!(installed.identifier.plugin_name, "acme-tax");
    assert_eq!(
        installed.path,
        fixture.ctx.plugins_dir().join("ruby/acme-tax/2.1.0")
    );
    assert!(installed.artifact.is_file());
}

#[test]
fn test_qualified_version_keeps_plugin_name() {
    let fixture = Fixture::new();
    fixture.publish_analytics("1.0.0-beta-2", b"analytics beta");
    let mut installer = fixture.installer();

    let installed = installer.install(&analytics("1.0.0-beta-2")).unwrap();

    assert_eq!(installed.identifier.plugin_name, "analytics-plugin");
    assert_eq!(installed.path, fixture.version_dir("1.0.0-beta-2"));
    assert!(
        fixture
            .version_dir("1.0.0-beta-2")
            .join("analytics-plugin-1.0.0-beta-2.jar")
            .is_file()
    );

    let removed = installer.uninstall("analytics-plugin", None).unwrap();
    assert_eq!(removed[0].version, "1.0.0-beta-2");
}

#[test]
fn test_recorded_digest_is_sha1_of_artifact() {
    let fixture = Fixture::new();
    fixture.publish_analytics("0.7.1", b"abc");
    let mut installer = fixture.installer();

    let installed = installer.install(&analytics("0.7.1")).unwrap();

    assert_eq!(installed.checksum, "a9993e364706816aba3e25717850c26c9cd0d89d");
    let store = ChecksumStore::open(fixture.ctx.checksum_file()).unwrap();
    assert_eq!(
        store.lookup(&installed.coordinate),
        Some("a9993e364706816aba3e25717850c26c9cd0d89d")
    );
}
