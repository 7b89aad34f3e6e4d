//! `kpm install`.

use super::common::CommandEnv;
use anyhow::{Context, Result};
use clap::Args;
use kpm_core::VersionSpec;
use kpm_core::cli::ExitCode;
use kpm_installer::{InstalledPlugin, PluginRequest};
use serde::Serialize;
use tracing::info;

/// Arguments for `kpm install`.
#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    /// Plugin key (e.g. analytics, stripe, braintree_blue)
    pub key: String,

    /// Group identifier, overriding the built-in table
    #[arg(long)]
    pub group: Option<String>,

    /// Artifact identifier, overriding the built-in table
    #[arg(long)]
    pub artifact: Option<String>,

    /// Packaging (jar, tar.gz)
    #[arg(long)]
    pub packaging: Option<String>,

    /// Classifier appended to the artifact file name
    #[arg(long)]
    pub classifier: Option<String>,

    /// Version to install, or "latest"
    #[arg(long, default_value = kpm_core::LATEST)]
    pub version: String,
}

impl InstallArgs {
    /// Builds the installer request.
    ///
    /// # Errors
    ///
    /// Returns an error if the version is blank.
    pub fn to_request(&self) -> Result<PluginRequest> {
        let version: VersionSpec = self
            .version
            .parse()
            .with_context(|| format!("invalid version '{}'", self.version))?;

        Ok(PluginRequest {
            key: self.key.clone(),
            group_id: self.group.clone(),
            artifact_id: self.artifact.clone(),
            packaging: self.packaging.clone(),
            classifier: self.classifier.clone(),
            version,
        })
    }
}

/// Result of a successful install.
#[derive(Debug, Serialize)]
struct InstallResult {
    key: String,
    plugin_name: String,
    version: String,
    language: String,
    coordinate: String,
    path: String,
    artifact: String,
    size: u64,
    checksum: String,
    checksum_recorded: bool,
}

impl From<InstalledPlugin> for InstallResult {
    fn from(installed: InstalledPlugin) -> Self {
        Self {
            key: installed.key,
            plugin_name: installed.identifier.plugin_name,
            version: installed.identifier.version,
            language: installed.identifier.language.to_string(),
            coordinate: installed.coordinate,
            path: installed.path.display().to_string(),
            artifact: installed.artifact.display().to_string(),
            size: installed.size,
            checksum: installed.checksum,
            checksum_recorded: installed.first_install,
        }
    }
}

/// Runs `kpm install`.
///
/// # Errors
///
/// Returns the installer error for the step that failed.
pub fn run(args: &InstallArgs, env: &CommandEnv) -> Result<ExitCode> {
    let request = args.to_request()?;
    info!("Installing '{}' ({})", request.key, request.version);

    let mut installer = env.installer();
    let installed = installer
        .install(&request)
        .with_context(|| format!("failed to install '{}'", request.key))?;

    env.print(&InstallResult::from(installed))?;
    Ok(ExitCode::SUCCESS)
}
