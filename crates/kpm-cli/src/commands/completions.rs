//! Shell completion generation.

use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use kpm_core::cli::ExitCode;
use std::io::{self, Write};
use tracing::debug;

/// Writes the completion script for `shell` to `out`.
pub fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    debug!("Generating {} completions", shell);
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, out);
}

/// Runs `kpm completions`, printing the script to stdout.
///
/// # Errors
///
/// Never fails; returns `Result` like every other command.
pub fn run(shell: Shell, cmd: &mut Command) -> Result<ExitCode> {
    write_completions(shell, cmd, &mut io::stdout());
    Ok(ExitCode::SUCCESS)
}
