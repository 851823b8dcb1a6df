//! Markdown normalization: deterministic cleanup of rendered output.
//!
//! Rendering engines pad their Markdown with artefacts that bloat a
//! version-controlled corpus without adding content: trailing whitespace,
//! long runs of blank lines, `/* Lines ... omitted */` comment markers,
//! and table rows whose every cell is empty. This module applies cheap,
//! deterministic line rules that shrink the file without changing what a
//! Markdown renderer displays.
//!
//! The pass is a single scan with one piece of state (a consecutive
//! blank-line counter), which makes it idempotent: normalizing already
//! normalized text is a no-op.
//!
//! Known limit: only comments that open and close on the same line are
//! dropped. A `/*` block spanning several lines passes through untouched.

use crate::error::DocError;
use crate::pipeline::backup;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

/// Full-line block comment, e.g. `/* Lines 10-20 omitted */`.
static RE_COMMENT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*/\*.*\*/\s*$").unwrap());

/// Candidate empty table row: starts with two adjacent pipes, ends with one.
static RE_EMPTY_TABLE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\|\s*\|.*\|\s*$").unwrap());

/// Normalize a Markdown string.
///
/// Rules, applied line by line in input order:
/// 1. Strip trailing whitespace from every line.
/// 2. Drop full-line `/* ... */` comments.
/// 3. Drop table rows whose cells are all empty.
/// 4. Allow at most 2 consecutive empty lines.
/// 5. Drop empty lines at the end of the document.
///
/// The result ends with exactly one newline. Pure function; never panics,
/// even on empty input.
pub fn normalize(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut empty_run = 0usize;

    for raw in text.split('\n') {
        let line = raw.trim_end();

        if RE_COMMENT_LINE.is_match(line) {
            continue;
        }

        if RE_EMPTY_TABLE_ROW.is_match(line) && line.split('|').all(|cell| cell.trim().is_empty())
        {
            continue;
        }

        if line.is_empty() {
            empty_run += 1;
            if empty_run <= 2 {
                out.push(line);
            }
        } else {
            empty_run = 0;
            out.push(line);
        }
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }

    let mut result = out.join("\n");
    result.push('\n');
    result
}

/// Normalize a Markdown file in place, backing it up first.
///
/// Returns `(original_size, new_size)` in bytes. A missing file is a
/// reported no-op `(0, 0)` rather than an error; the backup is written
/// before the destructive rewrite, so a crash mid-rewrite still leaves
/// the previous content recoverable under `backup_root`.
pub fn normalize_file(
    path: impl AsRef<Path>,
    backup_root: impl AsRef<Path>,
) -> Result<(u64, u64), DocError> {
    let path = path.as_ref();

    if !path.exists() {
        warn!("File not found, skipping normalization: {}", path.display());
        return Ok((0, 0));
    }

    let original_size = std::fs::metadata(path)
        .map_err(|e| DocError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?
        .len();

    let backup_path = backup::backup_file(path, backup_root)?;
    debug!("Backed up {} to {}", path.display(), backup_path.display());

    let content = std::fs::read_to_string(path).map_err(|e| DocError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let normalized = normalize(&content);

    std::fs::write(path, &normalized).map_err(|e| DocError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok((original_size, normalized.len() as u64))
}
