//! Core types, configuration, and errors for the KPM plugin manager.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`ArtifactId`, `ArtifactCoordinate`, `VersionSpec`,
//!   `PluginIdentifier`, `Language`)
//! - A run-scoped [`RunContext`] that owns the install layout paths
//! - Layered [`Settings`] (explicit argument > config file > default)
//! - CLI value types ([`cli::OutputFormat`], [`cli::ExitCode`])
//! - The shared [`Error`] type
//!
//! # Examples
//!
//! ```
//! use kpm_core::{ArtifactCoordinate, ArtifactId};
//!
//! let id = ArtifactId::new("org.kill-bill.billing.plugin.java", "analytics-plugin", "jar");
//! let coordinate = ArtifactCoordinate::new(id, "0.7.1");
//!
//! assert_eq!(
//!     coordinate.to_string(),
//!     "org.kill-bill.billing.plugin.java:analytics-plugin:jar:0.7.1"
//! );
//! assert_eq!(coordinate.file_name(), "analytics-plugin-0.7.1.jar");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod cli;
mod config;
mod context;
mod error;
mod types;

pub use config::{ConfigFile, DEFAULT_BUNDLES_DIR, DEFAULT_LOG_LEVEL, Overrides, Settings};
pub use context::{CHECKSUM_FILE, PLUGINS_DIR, REGISTRY_FILE, RunContext};
pub use error::{Error, Result};
pub use types::{
    ArtifactCoordinate, ArtifactId, Language, PluginIdentifier, VersionSpec, LATEST,
};
