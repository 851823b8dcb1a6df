//! # mdbatch
//!
//! Batch-convert a configured corpus of PDF documents to clean Markdown.
//!
//! ## Why this crate?
//!
//! Keeping a documentation corpus (framework guides, standards documents)
//! in Markdown means re-converting the source PDFs every time one is
//! revised. Doing that by hand produces drift: inconsistent whitespace,
//! broken image links, and no safety net when a rewrite goes wrong. This
//! crate drives the whole batch from a single JSON configuration and
//! applies the same deterministic cleanup to every file, with a
//! timestamped backup before each in-place rewrite.
//!
//! ## Pipeline Overview
//!
//! ```text
//! config.json
//!  │
//!  ├─ 1. Fetch      download the PDF (or copy a local file) to temp/
//!  ├─ 2. Render     PDF → raw Markdown + image payloads (Renderer trait)
//!  ├─ 3. Images     save payloads as <stem>_image_<n>.png, fix ![]() refs
//!  ├─ 4. Normalize  whitespace/comment/table cleanup (backup first)
//!  ├─ 5. Verify     check every image reference resolves on disk
//!  └─ 6. Summary    per-document success/failure + timings
//! ```
//!
//! Documents are processed strictly one at a time; a failed document is
//! recorded and the batch moves on to the next.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdbatch::{load_config, run_batch, DocumentFilter, PdfExtractRenderer, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("config.json")?;
//!     let renderer = PdfExtractRenderer::new();
//!     let summary = run_batch(
//!         &config,
//!         &DocumentFilter::All,
//!         RunOptions::default(),
//!         &renderer,
//!         None,
//!     )
//!     .await?;
//!     println!("{}/{} converted", summary.succeeded(), summary.outcomes.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mdbatch` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! mdbatch = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{
    format_duration, normalize_existing, run_batch, verify_existing, BatchSummary, DocOutcome,
    NormalizeSummary,
};
pub use config::{load_config, BatchConfig, DocumentFilter, DocumentSpec, RunOptions};
pub use error::{BatchError, DocError};
pub use pipeline::images::{ImageMapping, ImagePayload};
pub use pipeline::verify::VerificationReport;
pub use progress::{BatchProgressCallback, NoopBatchCallback, ProgressCallback};
pub use render::{PdfExtractRenderer, RenderMetadata, RenderedDocument, Renderer};
