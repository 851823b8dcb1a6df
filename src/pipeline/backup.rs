//! Timestamped backup copies, made before any in-place rewrite.
//!
//! Backups are plain byte-for-byte copies named
//! `<file_name>.<YYYYMMDD_HHMMSS>.bak` under an explicit backup root.
//! They are write-once: nothing in this crate reads them back; recovery
//! is a manual operation. Two backups of the same file within the same
//! second overwrite each other silently — the timestamp is a label, not
//! a uniqueness guarantee.

use crate::error::DocError;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Format string for backup timestamps, one-second resolution.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Copy `path` to `<backup_root>/<file_name>.<timestamp>.bak`.
///
/// Creates `backup_root` if needed. The original file is untouched and
/// remains the live copy. Returns the path of the new backup.
pub fn backup_file(
    path: impl AsRef<Path>,
    backup_root: impl AsRef<Path>,
) -> Result<PathBuf, DocError> {
    let path = path.as_ref();
    let backup_root = backup_root.as_ref();

    std::fs::create_dir_all(backup_root).map_err(|e| DocError::BackupFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DocError::BackupFailed {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
        })?;

    let timestamp = Local::now().format(TIMESTAMP_FORMAT);
    let backup_path = backup_root.join(format!("{file_name}.{timestamp}.bak"));

    std::fs::copy(path, &backup_path).map_err(|e| DocError::BackupFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("Created backup: {}", backup_path.display());
    Ok(backup_path)
}
