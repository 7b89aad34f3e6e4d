//! KPM command-line library.
//!
//! Exposes the command tree, handlers, formatters and logging bootstrap so
//! they can be exercised without spawning the `kpm` binary.

#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod formatters;
pub mod logging;

pub use cli::{Cli, Commands};
pub use commands::common::{CommandEnv, exit_code_for};
