//! `kpm checksum`: inspect and drop trusted digests.

use super::common::CommandEnv;
use anyhow::{Context, Result};
use clap::Subcommand;
use kpm_core::cli::ExitCode;
use kpm_store::{ChecksumRecord, ChecksumStore};
use serde::Serialize;
use tracing::{info, warn};

/// Checksum store actions.
#[derive(Subcommand, Debug, Clone)]
pub enum ChecksumAction {
    /// List every trusted digest
    List,

    /// Forget the digest of one coordinate
    ///
    /// The next install of that coordinate trusts whatever it downloads.
    Remove {
        /// Coordinate string (group:artifact:packaging[:classifier]:version)
        coordinate: String,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Debug, Serialize)]
struct ListResult {
    path: String,
    count: usize,
    checksums: ChecksumRecord,
}

#[derive(Debug, Serialize)]
struct RemoveResult {
    coordinate: String,
    removed: bool,
}

/// Runs a checksum action.
///
/// # Errors
///
/// Returns an error if the checksum file is corrupt or cannot be written.
pub fn run(action: &ChecksumAction, env: &CommandEnv) -> Result<ExitCode> {
    match action {
        ChecksumAction::List => list(env),
        ChecksumAction::Remove { coordinate, yes } => remove(coordinate, *yes, env),
    }
}

fn open(env: &CommandEnv) -> Result<ChecksumStore> {
    let path = env.ctx().checksum_file();
    ChecksumStore::open(&path)
        .with_context(|| format!("failed to open checksum store {}", path.display()))
}

fn list(env: &CommandEnv) -> Result<ExitCode> {
    let store = open(env)?;

    env.print(&ListResult {
        path: store.path().display().to_string(),
        count: store.len(),
        checksums: store.list().clone(),
    })?;
    Ok(ExitCode::SUCCESS)
}

fn remove(coordinate: &str, yes: bool, env: &CommandEnv) -> Result<ExitCode> {
    let mut store = open(env)?;

    if store.lookup(coordinate).is_none() {
        warn!("No trusted digest for {}", coordinate);
        env.print(&RemoveResult {
            coordinate: coordinate.to_string(),
            removed: false,
        })?;
        return Ok(ExitCode::NOT_FOUND);
    }

    if !yes {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Forget the trusted digest of {coordinate}? The next download will be trusted as-is."
            ))
            .default(false)
            .interact()
            .context("failed to read confirmation")?;

        if !confirmed {
            info!("Checksum removal cancelled");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let removed = store
        .remove(coordinate)
        .with_context(|| format!("failed to remove digest of {coordinate}"))?;

    env.print(&RemoveResult {
        coordinate: coordinate.to_string(),
        removed,
    })?;
    Ok(ExitCode::SUCCESS)
}
