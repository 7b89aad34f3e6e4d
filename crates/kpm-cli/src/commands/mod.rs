//! Command implementations.
//!
//! Each handler takes its parsed arguments and a [`CommandEnv`], prints a
//! serializable result through the shared formatters, and returns an
//! [`ExitCode`].

pub mod checksum;
pub mod common;
pub mod completions;
pub mod install;
pub mod list;
pub mod uninstall;
pub mod versions;

use crate::cli::{Cli, Commands};
use crate::logging::LogHandle;
use anyhow::Result;
use clap::CommandFactory;
use common::CommandEnv;
use kpm_core::cli::ExitCode;

/// Log directive applied while producing machine-readable output.
pub const QUIET_DIRECTIVE: &str = "warn";

/// Routes a parsed command to its handler.
///
/// With a [`LogHandle`] and a machine-readable format, info-level chatter is
/// silenced for the duration of the command.
///
/// # Errors
///
/// Returns the handler's error.
pub fn execute(command: &Commands, env: &CommandEnv, logs: Option<&LogHandle>) -> Result<ExitCode> {
    let _quiet = match logs {
        Some(logs) if env.format().is_machine_readable() => Some(logs.scoped(QUIET_DIRECTIVE)?),
        _ => None,
    };

    match command {
        Commands::Install(args) => install::run(args, env),
        Commands::Uninstall(args) => uninstall::run(args, env),
        Commands::List => list::run(env),
        Commands::Versions(args) => versions::run(args, env),
        Commands::Checksum { action } => checksum::run(action, env),
        Commands::Completions { shell } => completions::run(*shell, &mut Cli::command()),
    }
}
