//! Shared command plumbing: the per-invocation environment and exit codes.

use anyhow::Result;
use kpm_core::cli::{ExitCode, OutputFormat};
use kpm_core::{RunContext, Settings};
use kpm_installer::{InstallError, Installer, LocalRepository};
use kpm_store::StoreError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything a command needs for one invocation.
///
/// Built once from resolved [`Settings`] and passed to each handler.
#[derive(Debug, Clone)]
pub struct CommandEnv {
    ctx: RunContext,
    repository: PathBuf,
    format: OutputFormat,
}

impl CommandEnv {
    /// Creates an environment from its parts.
    #[must_use]
    pub fn new(ctx: RunContext, repository: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            ctx,
            repository: repository.into(),
            format,
        }
    }

    /// Creates an environment from resolved settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            RunContext::from_settings(settings),
            settings.repository.clone(),
            settings.format,
        )
    }

    /// Run context.
    #[must_use]
    pub const fn ctx(&self) -> &RunContext {
        &self.ctx
    }

    /// Repository root.
    #[must_use]
    pub fn repository(&self) -> &Path {
        &self.repository
    }

    /// Output format.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Installer reading from the configured repository.
    #[must_use]
    pub fn installer(&self) -> Installer<LocalRepository> {
        Installer::new(self.ctx.clone(), LocalRepository::new(&self.repository))
    }

    /// Formats `data` and writes it to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if formatting fails.
    pub fn print<T: Serialize>(&self, data: &T) -> Result<()> {
        let formatted = crate::formatters::format_output(data, self.format)?;
        println!("{formatted}");
        Ok(())
    }
}

/// Maps a command failure to its exit code.
///
/// The first typed error found in the cause chain decides; anything
/// unrecognised is a general error.
///
/// # Examples
///
/// ```
/// use kpm_cli::commands::common::exit_code_for;
/// use kpm_core::cli::ExitCode;
/// use kpm_installer::InstallError;
///
/// let err = anyhow::Error::new(InstallError::NotFound { target: "stripe".into() })
///     .context("uninstall failed");
/// assert_eq!(exit_code_for(&err), ExitCode::NOT_FOUND);
/// ```
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<InstallError>() {
            return match err {
                InstallError::NotFound { .. } => ExitCode::NOT_FOUND,
                InstallError::Integrity { .. } => ExitCode::INTEGRITY_FAILURE,
                InstallError::Resolution { .. } | InstallError::InvalidArgument(_) => {
                    ExitCode::INVALID_INPUT
                }
                InstallError::Store(store) if store.is_recoverable() => ExitCode::INVALID_INPUT,
                InstallError::Store(_) | InstallError::Fetch { .. } => ExitCode::ERROR,
            };
        }
        if let Some(err) = cause.downcast_ref::<StoreError>() {
            return if err.is_recoverable() {
                ExitCode::INVALID_INPUT
            } else {
                ExitCode::ERROR
            };
        }
        if let Some(err) = cause.downcast_ref::<kpm_core::Error>() {
            return if err.is_invalid_argument() || err.is_config_error() {
                ExitCode::INVALID_INPUT
            } else {
                ExitCode::ERROR
            };
        }
    }
    ExitCode::ERROR
}
