//! Upload name checks.

use crate::error::{Error, Result};

/// Whether `filename` carries one of the `allowed` extensions (case-insensitive).
#[must_use]
pub fn allowed_file(filename: &str, allowed: &[String]) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Reduce a client supplied file name to a safe, flat ASCII name.
///
/// Path separators and whitespace become `_`, characters outside
/// `[A-Za-z0-9._-]` are dropped and leading or trailing dots and underscores
/// are trimmed, so `../../etc/passwd` becomes `etc_passwd`.
///
/// # Errors
///
/// Returns [`Error::InvalidFilename`] if nothing usable is left.
pub fn secure_filename(filename: &str) -> Result<String> {
    let spaced = filename.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let trimmed = kept.trim_matches(['.', '_']);

    if trimmed.is_empty() {
        return Err(Error::InvalidFilename {
            filename: filename.to_string(),
        });
    }

    Ok(trimmed.to_string())
}
