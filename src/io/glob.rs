//! Glob expansion for part-file patterns such as `out/part-*.csv`.
//!
//! Matches are restricted to regular files and returned sorted, so the same
//! pattern always yields the same partition order.

use crate::error::{Result, ShardError};
use glob::glob;
use std::path::PathBuf;

/// Whether `s` contains glob metacharacters.
#[must_use]
pub fn is_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Expand `pattern` into a sorted list of matching files.
///
/// Supports the usual syntax: `*`, `?`, `**`, `[abc]`, `[!abc]`.
///
/// # Errors
///
/// - `InvalidPath` if the pattern itself is malformed.
/// - `Io` if a matched entry cannot be inspected.
///
/// Zero matches is not an error here; callers decide what an empty result
/// means.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob(pattern).map_err(|e| {
        tracing::debug!(pattern, error = %e, "malformed glob pattern");
        ShardError::invalid_path(pattern)
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ShardError::Io {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
