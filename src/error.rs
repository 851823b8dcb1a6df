//! Error types for the mdbatch library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BatchError`] — **Fatal**: the batch run cannot proceed at all
//!   (missing/unparsable configuration, empty document selection, missing
//!   output directory in normalize-only mode). Returned as
//!   `Err(BatchError)` from the top-level batch entry points.
//!
//! * [`DocError`] — **Non-fatal**: a single document failed (download
//!   error, render failure, write error) but the remaining documents are
//!   still processed. Caught at the document boundary and recorded in
//!   [`crate::batch::BatchSummary`] so a run reports partial success
//!   instead of losing the whole batch to one bad document.
//!
//! The separation lets callers decide their own tolerance: inspect the
//! summary, log and continue, or treat any failure as a non-zero exit.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mdbatch library.
///
/// Per-document failures use [`DocError`] and are recorded in
/// [`crate::batch::BatchSummary`] rather than propagated here.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Configuration file was not found at the given path.
    #[error("Configuration file not found: '{path}'\nCheck the path exists and is readable.")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file exists but is not valid JSON.
    #[error("Failed to parse configuration '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file could not be read.
    #[error("Failed to read configuration '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration defines no documents at all.
    #[error("No documents defined in configuration")]
    NoDocumentsConfigured,

    /// Name/version filters matched no configured documents.
    #[error("No documents selected after filtering")]
    NoDocumentsSelected,

    /// The output directory does not exist (normalize-only / verify-only modes).
    #[error("Output directory not found: '{path}'")]
    OutputDirMissing { path: PathBuf },

    /// The output directory contains no Markdown files to process.
    #[error("No Markdown files found in '{path}'")]
    NoMarkdownFiles { path: PathBuf },

    /// Could not create one of the working directories.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document.
///
/// Any step of the per-document pipeline (fetch, render, image save,
/// markdown write, normalize, verify) can produce one; the batch continues
/// with the next document.
#[derive(Debug, Error)]
pub enum DocError {
    /// Source file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The rendering engine rejected the document.
    #[error("Rendering failed for '{path}': {detail}")]
    RenderFailed { path: PathBuf, detail: String },

    /// An image payload could not be persisted to disk.
    #[error("Failed to save image '{path}': {detail}")]
    ImageSaveFailed { path: PathBuf, detail: String },

    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read a Markdown file back for post-processing.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pre-rewrite backup copy failed.
    #[error("Failed to back up '{path}': {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
