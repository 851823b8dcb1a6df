//! Progress-callback trait for per-document batch events.
//!
//! Pass an `Arc<dyn BatchProgressCallback>` to
//! [`crate::batch::run_batch`] to receive events as each document moves
//! through the pipeline. The callback approach is the least-invasive
//! integration point: callers can forward events to a terminal progress
//! bar, a log file, or a CI annotation without the library knowing how
//! the host application communicates.
//!
//! Documents are processed strictly one at a time, so events for one
//! document never interleave with another's; the trait is still
//! `Send + Sync` so callbacks can be shared across an async runtime.

use std::sync::Arc;

/// Called by the batch orchestrator as it processes each document.
///
/// All methods have default no-op implementations so callers only
/// override what they care about.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first document.
    fn on_batch_start(&self, total_docs: usize) {
        let _ = total_docs;
    }

    /// Called just before a document's fetch step begins.
    ///
    /// `index` is 1-based.
    fn on_document_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when a document finishes successfully.
    ///
    /// `elapsed_ms` covers fetch through verification.
    fn on_document_complete(&self, index: usize, total: usize, name: &str, elapsed_ms: u64) {
        let _ = (index, total, name, elapsed_ms);
    }

    /// Called when any step of a document's pipeline fails.
    fn on_document_error(&self, index: usize, total: usize, name: &str, error: String) {
        let _ = (index, total, name, error);
    }

    /// Called once after the last document.
    fn on_batch_complete(&self, succeeded: usize, failed: usize) {
        let _ = (succeeded, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopBatchCallback;

impl BatchProgressCallback for NoopBatchCallback {}

/// Convenience alias matching the type the orchestrator accepts.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
