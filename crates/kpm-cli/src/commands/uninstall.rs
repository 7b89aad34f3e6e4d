//! `kpm uninstall`.

use super::common::CommandEnv;
use anyhow::{Context, Result};
use clap::Args;
use kpm_core::cli::ExitCode;
use kpm_installer::UninstalledPlugin;
use serde::Serialize;
use tracing::info;

/// Arguments for `kpm uninstall`.
#[derive(Args, Debug, Clone)]
pub struct UninstallArgs {
    /// Plugin key or plugin name
    pub target: String,

    /// Only disable this version
    #[arg(long)]
    pub version: Option<String>,
}

#[derive(Debug, Serialize)]
struct UninstallResult {
    target: String,
    disabled_count: usize,
    disabled: Vec<UninstalledPlugin>,
}

/// Runs `kpm uninstall`.
///
/// # Errors
///
/// Returns a not-found error if no enabled plugin matches.
pub fn run(args: &UninstallArgs, env: &CommandEnv) -> Result<ExitCode> {
    info!("Uninstalling '{}'", args.target);

    let mut installer = env.installer();
    let disabled = installer
        .uninstall(&args.target, args.version.as_deref())
        .with_context(|| format!("failed to uninstall '{}'", args.target))?;

    env.print(&UninstallResult {
        target: args.target.clone(),
        disabled_count: disabled.len(),
        disabled,
    })?;
    Ok(ExitCode::SUCCESS)
}
