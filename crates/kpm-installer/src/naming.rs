//! Plugin name derivation from artifact file names.
//!
//! A file stem is split on `-` and classified segment by segment:
//!
//! ```text
//! segment     := version | pre-release | name
//! version     := digits ( "." digits )*
//! pre-release := "SNAPSHOT"
//! name        := anything else
//! ```
//!
//! Trailing pre-release and version segments are noise; removal stops at the
//! first name segment from the end and everything before it is kept verbatim.
//! When no version segment was removed, the last remaining segment is taken
//! to be a qualifier and dropped as well (`xxx-foo-abc.jar` names the plugin
//! `xxx-foo`, and so does `xxx-foo.jar`).
//!
//! The installer knows the exact version it fetched and strips it directly
//! with [`derive_plugin_name_for_version`], so qualified versions such as
//! `1.0.0-beta-2` never reach the heuristic.

use std::path::Path;

/// Literal pre-release marker recognised at the end of a file stem.
pub const PRE_RELEASE_MARKER: &str = "SNAPSHOT";

/// Multi-part extensions checked before falling back to the last `.`.
const COMPOUND_EXTENSIONS: &[&str] = &[".tar.gz", ".tar.bz2", ".tar.xz"];

/// One `-`-separated piece of a file stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Part of the plugin name
    Name(&'a str),
    /// Version digits, e.g. `1.0.0`
    Version(&'a str),
    /// The `SNAPSHOT` marker
    PreRelease,
}

impl<'a> Segment<'a> {
    fn classify(raw: &'a str) -> Self {
        if raw == PRE_RELEASE_MARKER {
            Self::PreRelease
        } else if is_version_token(raw) {
            Self::Version(raw)
        } else {
            Self::Name(raw)
        }
    }

    const fn as_str(&self) -> &'a str {
        match *self {
            Self::Name(raw) | Self::Version(raw) => raw,
            Self::PreRelease => PRE_RELEASE_MARKER,
        }
    }
}

/// Returns `true` for digit groups joined by single dots (`1`, `1.0`, `0.7.1`).
///
/// # Examples
///
/// ```
/// use kpm_installer::naming::is_version_token;
///
/// assert!(is_version_token("0.7.1"));
/// assert!(is_version_token("12"));
/// assert!(!is_version_token("1..0"));
/// assert!(!is_version_token("v1"));
/// ```
#[must_use]
pub fn is_version_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .split('.')
            .all(|group| !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit()))
}

/// Removes directory components and the packaging extension.
#[must_use]
pub fn file_stem(file_path: &str) -> &str {
    let file_name = Path::new(file_path)
        .file_name()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or(file_path);

    for extension in COMPOUND_EXTENSIONS {
        if let Some(stem) = file_name.strip_suffix(extension) {
            return stem;
        }
    }

    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(index) => &file_name[..index],
    }
}

/// Splits a file stem into classified segments. Empty pieces are skipped.
#[must_use]
pub fn tokenize(stem: &str) -> Vec<Segment<'_>> {
    stem.split('-')
        .filter(|piece| !piece.is_empty())
        .map(Segment::classify)
        .collect()
}

/// Derives the bare plugin name from an artifact path or file name.
///
/// Returns `None` when nothing name-like is left, e.g. for `1.0.0.jar`.
///
/// # Examples
///
/// ```
/// use kpm_installer::naming::derive_plugin_name;
///
/// assert_eq!(
///     derive_plugin_name("/tmp/analytics-plugin-0.7.1.jar").as_deref(),
///     Some("analytics-plugin")
/// );
/// assert_eq!(
///     derive_plugin_name("stripe-plugin-3.0.2.tar.gz").as_deref(),
///     Some("stripe-plugin")
/// );
/// ```
#[must_use]
pub fn derive_plugin_name(file_path: &str) -> Option<String> {
    let mut segments = tokenize(file_stem(file_path));

    let mut saw_version = false;
    while let Some(segment) = segments.last() {
        match segment {
            Segment::PreRelease => {}
            Segment::Version(_) => saw_version = true,
            Segment::Name(_) => break,
        }
        segments.pop();
    }

    if !saw_version && segments.len() > 1 {
        segments.pop();
    }

    if segments.is_empty() {
        None
    } else {
        let pieces: Vec<&str> = segments.iter().map(Segment::as_str).collect();
        Some(pieces.join("-"))
    }
}

/// Derives the plugin name of an artifact whose version is known.
///
/// Strips `-<version>` from the file stem when present and falls back to
/// [`derive_plugin_name`] otherwise.
///
/// # Examples
///
/// ```
/// use kpm_installer::naming::derive_plugin_name_for_version;
///
/// assert_eq!(
///     derive_plugin_name_for_version("analytics-plugin-1.0.0-beta-2.jar", "1.0.0-beta-2")
///         .as_deref(),
///     Some("analytics-plugin")
/// );
/// ```
#[must_use]
pub fn derive_plugin_name_for_version(file_path: &str, version: &str) -> Option<String> {
    let stripped = file_stem(file_path)
        .strip_suffix(version)
        .and_then(|rest| rest.strip_suffix('-'))
        .map(|rest| rest.trim_end_matches('-'));

    match stripped {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => derive_plugin_name(file_path),
    }
}
