//! KPM plugin manager CLI.
//!
//! # Examples
//!
//! ```bash
//! # Install the newest analytics plugin into the default bundles directory
//! kpm install analytics
//!
//! # Disable it again, by key or by plugin name
//! kpm uninstall analytics-plugin
//!
//! # Machine-readable inventory
//! kpm --format json list
//! ```

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use kpm_cli::logging;
use kpm_cli::{Cli, CommandEnv, exit_code_for};
use kpm_core::cli::ExitCode;
use kpm_core::{ConfigFile, Settings};

fn main() {
    let cli = Cli::parse();

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            exit_code_for(&err)
        }
    };

    std::process::exit(exit_code.as_i32());
}

/// Resolves settings, initializes logging, and runs the command.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the command fails.
fn run(cli: &Cli) -> Result<ExitCode> {
    let file = match cli.config.clone().or_else(ConfigFile::default_path) {
        Some(path) => ConfigFile::load(&path)?,
        None => ConfigFile::default(),
    };
    let settings = Settings::resolve(&cli.overrides(), &file)?;

    let logs = logging::init(&settings.log_level, cli.verbose)?;
    tracing::debug!(
        "Bundles dir {}, repository {}",
        settings.bundles_dir.display(),
        settings.repository.display()
    );

    let env = CommandEnv::from_settings(&settings);
    kpm_cli::commands::execute(&cli.command, &env, (!cli.verbose).then_some(&logs))
}
