//! Plugin resolution and installation for KPM.
//!
//! Ties the persistence layer in `kpm-store` to an artifact source:
//!
//! - [`CoordinateResolver`]: plugin key or explicit coordinates plus a
//!   version token to a concrete [`ArtifactCoordinate`](kpm_core::ArtifactCoordinate)
//! - [`naming`]: plugin name derivation from artifact file names
//! - [`ArtifactTransport`]: where bytes and version listings come from, with
//!   [`LocalRepository`] reading a Maven-layout directory
//! - [`Installer`]: install and uninstall as ordered state transitions
//!
//! # Install Order
//!
//! ```text
//! resolve -> fetch -> verify/trust digest -> write artifact -> clear marker -> register
//! ```
//!
//! Each step runs only if the previous one succeeded. Resolution touches
//! nothing on disk, so an unknown key leaves no trace.
//!
//! # Examples
//!
//! ```
//! use kpm_core::{RunContext, VersionSpec};
//! use kpm_installer::{Installer, LocalRepository, PluginRequest};
//! use std::fs;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let temp = tempfile::tempdir()?;
//! let repo = LocalRepository::new(temp.path().join("repo"));
//! let published = repo
//!     .root()
//!     .join("org/kill-bill/billing/plugin/java/analytics-plugin/0.7.1");
//! fs::create_dir_all(&published)?;
//! fs::write(published.join("analytics-plugin-0.7.1.jar"), b"jar")?;
//!
//! let mut installer = Installer::new(RunContext::new(temp.path().join("bundles")), repo);
//! let installed = installer.install(&PluginRequest::new("analytics", VersionSpec::Latest))?;
//! assert_eq!(installed.identifier.plugin_name, "analytics-plugin");
//! assert_eq!(installed.identifier.version, "0.7.1");
//!
//! let removed = installer.uninstall("analytics-plugin", None)?;
//! assert_eq!(removed.len(), 1);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod error;
mod installer;
pub mod naming;
mod resolver;
mod transport;

pub use error::{InstallError, Result, TransportError};
pub use installer::{InstalledPlugin, Installer, InventoryEntry, UninstalledPlugin};
pub use resolver::{
    CoordinateResolver, DEFAULT_PACKAGING, KNOWN_PLUGINS, KnownPlugin, PluginRequest,
    ResolvedPlugin, known_plugin,
};
pub use transport::{ArtifactTransport, LocalRepository, compare_versions};
