//! Digest utilities for artifact integrity verification.
//!
//! Artifacts are hashed with SHA-1 and recorded as lowercase hex, matching
//! the `sha1` table of the checksum file.

use sha1::{Digest, Sha1};

/// Length of a hex-encoded SHA-1 digest.
pub const DIGEST_HEX_LEN: usize = 40;

/// Compares two strings in constant time.
///
/// Always walks the longer of the two inputs so the running time does not
/// depend on the position of the first mismatch.
///
/// # Examples
///
/// ```
/// # use kpm_store::checksum::constant_time_compare;
/// assert!(constant_time_compare("abc123", "abc123"));
/// assert!(!constant_time_compare("abc123", "def456"));
/// assert!(!constant_time_compare("abc", "abcdef"));
/// ```
#[must_use]
#[allow(clippy::similar_names)]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let len_match = a.len() == b.len();

    let bytes_a = a.as_bytes();
    let bytes_b = b.as_bytes();
    let max_len = a.len().max(b.len());

    let mut diff = 0u8;
    for i in 0..max_len {
        let byte_a = bytes_a.get(i).copied().unwrap_or(0);
        let byte_b = bytes_b.get(i).copied().unwrap_or(0);
        diff |= byte_a ^ byte_b;
    }

    len_match && diff == 0
}

/// Computes the hex-encoded digest of an artifact.
///
/// # Examples
///
/// ```
/// use kpm_store::checksum::compute_digest;
///
/// assert_eq!(compute_digest(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
/// ```
#[must_use]
pub fn compute_digest(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Checks that a string looks like a digest produced by [`compute_digest`].
///
/// # Examples
///
/// ```
/// use kpm_store::checksum::{compute_digest, is_valid_digest};
///
/// assert!(is_valid_digest(&compute_digest(b"x")));
/// assert!(!is_valid_digest("abc123"));
/// assert!(!is_valid_digest(&"G".repeat(40)));
/// ```
#[must_use]
pub fn is_valid_digest(digest: &str) -> bool {
    digest.len() == DIGEST_HEX_LEN
        && digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
