//! Persistence layer for the KPM plugin manager.
//!
//! Holds the state that must survive between command invocations:
//!
//! - [`ChecksumStore`]: coordinate to trusted digest (`<bundles_dir>/sha1.json`)
//! - [`IdentifierRegistry`]: plugin key to enabled-plugin metadata
//!   (`<bundles_dir>/plugins/plugin_identifiers.json`)
//! - [`PluginDirectoryManager`]: the `plugins/<language>/<name>/<version>/`
//!   tree and its disabled markers
//!
//! # Architecture
//!
//! ```text
//! <bundles_dir>/
//! ├── sha1.json
//! └── plugins/
//!     ├── plugin_identifiers.json
//!     └── java/
//!         └── analytics-plugin/
//!             └── 0.7.1/
//!                 ├── analytics-plugin-0.7.1.jar
//!                 └── tmp/disabled.txt
//! ```
//!
//! Both JSON documents are rewritten whole on every mutation: serialized into
//! a private staging directory next to the target, renamed over it, then read
//! back. The registry is never the sole record of what is installed; a
//! version directory may exist while its key is absent (disabled).
//!
//! # Concurrency
//!
//! Designed for one writer per bundles directory. Two processes mutating the
//! same store race and the last rename wins.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod checksum;
mod checksum_store;
pub mod error;
pub mod layout;
mod persist;
mod registry;

pub use checksum::{compute_digest, constant_time_compare};
pub use checksum_store::{ChecksumRecord, ChecksumStore};
pub use error::{Result, StoreError};
pub use layout::{InstalledVersion, PluginDirectoryManager};
pub use persist::STAGING_PREFIX;
pub use registry::IdentifierRegistry;
