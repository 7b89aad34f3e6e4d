//! Command-line definition.

use crate::commands::checksum::ChecksumAction;
use crate::commands::install::InstallArgs;
use crate::commands::uninstall::UninstallArgs;
use crate::commands::versions::VersionsArgs;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use kpm_core::Overrides;
use std::path::PathBuf;

/// KPM - install and manage versioned platform plugins.
///
/// Resolves plugins from a Maven-layout repository, verifies their digests,
/// and keeps the bundles directory and the enabled-plugin registry in sync.
#[derive(Parser, Debug)]
#[command(name = "kpm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true)]
    pub format: Option<String>,

    /// Configuration file (defaults to <config dir>/kpm/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Bundles directory holding installed plugins
    #[arg(long, global = true, env = "KPM_BUNDLES_DIR")]
    pub bundles_dir: Option<PathBuf>,

    /// Maven-layout repository to install from
    #[arg(long, global = true, env = "KPM_REPOSITORY")]
    pub repository: Option<PathBuf>,
}

impl Cli {
    /// Values given on the command line or through the environment.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            bundles_dir: self.bundles_dir.clone(),
            repository: self.repository.clone(),
            log_level: self.verbose.then(|| "debug".to_string()),
            format: self.format.clone(),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a plugin and enable it.
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Newest published analytics plugin
    /// kpm install analytics
    ///
    /// # Pinned version
    /// kpm install stripe --version 3.0.2
    ///
    /// # Plugin missing from the built-in table
    /// kpm install acme --group com.acme --artifact acme-plugin --packaging tar.gz
    /// ```
    Install(InstallArgs),

    /// Disable an installed plugin, by key or by plugin name.
    ///
    /// Artifacts stay on disk; reinstalling re-enables them.
    Uninstall(UninstallArgs),

    /// List installed versions and which ones are enabled.
    List,

    /// List versions available in the repository.
    Versions(VersionsArgs),

    /// Inspect or drop trusted artifact digests.
    Checksum {
        /// Checksum action
        #[command(subcommand)]
        action: ChecksumAction,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}
