//! Turning a user path into the ordered set of part files to load.
//!
//! A path may name a single file, a directory of part files, or a glob
//! pattern. Each resolved file becomes one [`PartFile`] whose `key` records
//! its discovery position; that key is what keeps partition order stable
//! through execution, whatever order workers finish in.

use crate::error::{Result, ShardError};
use crate::io::glob::{expand_glob, is_pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One physical partition of a dataset.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartFile {
    /// Discovery order, starting at 0.
    pub key: usize,
    pub path: PathBuf,
}

/// Resolve `path` into part files in discovery order.
///
/// - A regular file yields itself.
/// - A directory yields the regular files directly inside it, sorted by name.
///   Names starting with `.` or `_` are skipped; these are the marker and
///   checksum files distributed writers leave next to their output.
/// - A path with glob metacharacters yields its sorted matches.
///
/// A leading `file://` scheme is accepted and ignored.
///
/// # Errors
///
/// `InvalidPath` when the path is empty, missing, or resolves to no files.
pub fn resolve(path: impl AsRef<Path>) -> Result<Vec<PartFile>> {
    let raw = path.as_ref().to_string_lossy().into_owned();
    let local = raw.strip_prefix("file://").unwrap_or(&raw);
    if local.trim().is_empty() {
        return Err(ShardError::invalid_path(raw.clone()));
    }

    let target = Path::new(local);
    let files = if target.is_file() {
        vec![target.to_path_buf()]
    } else if target.is_dir() {
        list_dir(target)?
    } else if is_pattern(local) {
        expand_glob(local)?
    } else {
        Vec::new()
    };

    if files.is_empty() {
        return Err(ShardError::invalid_path(raw));
    }

    let parts: Vec<PartFile> = files
        .into_iter()
        .enumerate()
        .map(|(key, path)| PartFile { key, path })
        .collect();
    for part in &parts {
        tracing::debug!(key = part.key, path = %part.path.display(), "resolved part file");
    }
    Ok(parts)
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| ShardError::Io {
            path: e.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() || is_sidecar(entry.file_name().to_string_lossy().as_ref()) {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

fn is_sidecar(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}
