//! `kpm list`.

use super::common::CommandEnv;
use anyhow::{Context, Result};
use kpm_core::cli::ExitCode;
use kpm_installer::InventoryEntry;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct ListResult {
    bundles_dir: String,
    enabled_count: usize,
    installed_count: usize,
    installed: Vec<InventoryEntry>,
}

/// Runs `kpm list`.
///
/// Never creates the bundles directory.
///
/// # Errors
///
/// Returns an error if the registry is corrupt or the plugins tree cannot be
/// read.
pub fn run(env: &CommandEnv) -> Result<ExitCode> {
    let bundles_dir = env.ctx().bundles_dir();
    info!("Listing plugins in {}", bundles_dir.display());

    let installed = env
        .installer()
        .inventory()
        .context("failed to read installed plugins")?;

    if installed.is_empty() {
        warn!("No plugins installed in {}", bundles_dir.display());
    }

    env.print(&ListResult {
        bundles_dir: bundles_dir.display().to_string(),
        enabled_count: installed.iter().filter(|entry| entry.key.is_some()).count(),
        installed_count: installed.len(),
        installed,
    })?;
    Ok(ExitCode::SUCCESS)
}
