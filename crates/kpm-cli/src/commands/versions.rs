//! `kpm versions`.

use super::common::CommandEnv;
use anyhow::{Context, Result};
use clap::Args;
use kpm_core::VersionSpec;
use kpm_core::cli::ExitCode;
use kpm_installer::{CoordinateResolver, PluginRequest};
use serde::Serialize;

/// Arguments for `kpm versions`.
#[derive(Args, Debug, Clone)]
pub struct VersionsArgs {
    /// Plugin key
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
}

#[derive(Debug, Serialize)]
struct VersionsResult {
    key: String,
    artifact: String,
    latest: Option<String>,
    versions: Vec<String>,
}

/// Runs `kpm versions`.
///
/// # Errors
///
/// Returns a resolution error for an unknown key, or a fetch error if the
/// repository cannot be read.
pub fn run(args: &VersionsArgs, env: &CommandEnv) -> Result<ExitCode> {
    let request = PluginRequest {
        key: args.key.clone(),
        group_id: args.group.clone(),
        artifact_id: args.artifact.clone(),
        packaging: args.packaging.clone(),
        classifier: None,
        version: VersionSpec::Latest,
    };
    let (id, _) = CoordinateResolver::resolve_id(&request)?;

    let versions = env
        .installer()
        .available_versions(&request)
        .with_context(|| format!("failed to list versions of {id}"))?;

    env.print(&VersionsResult {
        key: args.key.clone(),
        artifact: id.to_string(),
        latest: versions.last().cloned(),
        versions,
    })?;
    Ok(ExitCode::SUCCESS)
}
