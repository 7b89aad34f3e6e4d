//! Run-scoped context shared by every component of one command execution.

use crate::Settings;
use std::path::{Path, PathBuf};

/// Directory under the bundles root that holds installed plugins.
pub const PLUGINS_DIR: &str = "plugins";

/// Checksum store file name, relative to the bundles root.
pub const CHECKSUM_FILE: &str = "sha1.json";

/// Identifier registry file name, relative to the plugins directory.
pub const REGISTRY_FILE: &str = "plugin_identifiers.json";

/// Paths and settings for a single invocation.
///
/// Constructed once per command and handed explicitly to each component,
/// so nothing in the workspace depends on process-wide mutable state.
///
/// # Examples
///
/// ```
/// use kpm_core::RunContext;
/// use std::path::Path;
///
/// let ctx = RunContext::new("/var/tmp/bundles");
/// assert_eq!(ctx.plugins_dir(), Path::new("/var/tmp/bundles/plugins"));
/// assert_eq!(
///     ctx.registry_file(),
///     Path::new("/var/tmp/bundles/plugins/plugin_identifiers.json")
/// );
/// assert_eq!(ctx.checksum_file(), Path::new("/var/tmp/bundles/sha1.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    bundles_dir: PathBuf,
}

impl RunContext {
    /// Creates a context rooted at `bundles_dir`.
    #[must_use]
    pub fn new(bundles_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundles_dir: bundles_dir.into(),
        }
    }

    /// Creates a context from resolved settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.bundles_dir.clone())
    }

    /// Root of the install layout.
    #[must_use]
    pub fn bundles_dir(&self) -> &Path {
        &self.bundles_dir
    }

    /// `<bundles_dir>/plugins`
    #[must_use]
    pub fn plugins_dir(&self) -> PathBuf {
        self.bundles_dir.join(PLUGINS_DIR)
    }

    /// Backing file of the checksum store.
    #[must_use]
    pub fn checksum_file(&self) -> PathBuf {
        self.bundles_dir.join(CHECKSUM_FILE)
    }

    /// Backing file of the identifier registry.
    #[must_use]
    pub fn registry_file(&self) -> PathBuf {
        self.plugins_dir().join(REGISTRY_FILE)
    }
}
