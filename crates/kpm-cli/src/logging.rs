//! Logging bootstrap with scoped verbosity.
//!
//! The active [`EnvFilter`] sits behind a reload layer. Commands that need a
//! different verbosity for part of their run take a [`ScopedFilter`] guard
//! instead of mutating global logger state; dropping the guard restores the
//! previous filter.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt};

/// Handle to the process-wide log filter.
#[derive(Debug, Clone)]
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Wraps an existing reload handle.
    #[must_use]
    pub const fn new(handle: reload::Handle<EnvFilter, Registry>) -> Self {
        Self { handle }
    }

    /// Replaces the active filter with `directive` until the guard is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `directive` does not parse or the subscriber is
    /// gone.
    pub fn scoped(&self, directive: &str) -> Result<ScopedFilter> {
        let replacement = EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log directive '{directive}'"))?;

        let mut previous = None;
        self.handle
            .modify(|filter| previous = Some(std::mem::replace(filter, replacement)))
            .context("failed to swap log filter")?;

        Ok(ScopedFilter {
            handle: self.handle.clone(),
            previous,
        })
    }

    /// Text form of the active filter.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.handle.with_current(ToString::to_string).ok()
    }
}

/// Restores the previous log filter when dropped.
#[derive(Debug)]
#[must_use = "the previous filter is restored as soon as the guard is dropped"]
pub struct ScopedFilter {
    handle: reload::Handle<EnvFilter, Registry>,
    previous: Option<EnvFilter>,
}

impl Drop for ScopedFilter {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take()
            && let Err(e) = self.handle.reload(previous)
        {
            eprintln!("failed to restore log filter: {e}");
        }
    }
}

/// Filter used at startup.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` wins over the configured
/// level.
#[must_use]
pub fn initial_filter(level: &str, verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(level: &str, verbose: bool) -> Result<LogHandle> {
    let (filter, handle) = reload::Layer::new(initial_filter(level, verbose));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to initialize logging")?;

    Ok(LogHandle::new(handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(logs: &LogHandle) -> String {
        logs.current().unwrap().to_lowercase()
    }

    #[test]
    fn test_scoped_filter_restores_previous() {
        let (layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("info"));
        let _subscriber = tracing_subscriber::registry().with(layer);
        let logs = LogHandle::new(handle);

        assert_eq!(active(&logs), "info");
        {
            let _quiet = logs.scoped("warn").unwrap();
            assert_eq!(active(&logs), "warn");
        }
        assert_eq!(active(&logs), "info");
    }

    #[test]
    fn test_nested_scopes_unwind_in_order() {
        let (layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("info"));
        let _subscriber = tracing_subscriber::registry().with(layer);
        let logs = LogHandle::new(handle);

        let outer = logs.scoped("warn").unwrap();
        let inner = logs.scoped("error").unwrap();
        assert_eq!(active(&logs), "error");

        drop(inner);
        assert_eq!(active(&logs), "warn");
        drop(outer);
        assert_eq!(active(&logs), "info");
    }

    #[test]
    fn test_invalid_directive_keeps_filter() {
        let (layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("info"));
        let _subscriber = tracing_subscriber::registry().with(layer);
        let logs = LogHandle::new(handle);

        assert!(logs.scoped("kpm=loudest").is_err());
        assert_eq!(active(&logs), "info");
    }

    #[test]
    fn test_verbose_forces_debug() {
        assert_eq!(initial_filter("warn", true).to_string().to_lowercase(), "debug");
    }
}
