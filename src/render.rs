//! The rendering seam: PDF in, raw Markdown plus image payloads out.
//!
//! This crate does not parse PDFs itself — rendering is delegated to an
//! external engine behind the [`Renderer`] trait. The batch orchestrator
//! is generic over it, which keeps the core (normalization, image
//! reconciliation, verification) testable with a stub and lets the engine
//! be swapped without touching any other stage.
//!
//! [`PdfExtractRenderer`] is the bundled implementation, a thin delegate
//! over the `pdf-extract` crate. It produces text-only Markdown (no image
//! payloads); richer engines that extract figures plug in through the
//! same trait and the rest of the pipeline picks up their images
//! automatically.

use crate::error::DocError;
use crate::pipeline::images::ImagePayload;
use std::path::Path;
use tracing::debug;

/// Document-level metadata reported by the rendering engine.
#[derive(Debug, Clone, Default)]
pub struct RenderMetadata {
    /// Page count, when the engine knows it.
    pub pages: Option<usize>,
}

/// Everything the rendering engine produces for one document.
///
/// `images` pairs each renderer-internal identifier with its payload, in
/// the engine's own iteration order — downstream image numbering follows
/// this order, so it is only stable if the engine's order is. Identifiers
/// are unique within one document.
#[derive(Debug)]
pub struct RenderedDocument {
    /// Raw Markdown as emitted by the engine, before any cleanup.
    pub markdown: String,
    pub metadata: RenderMetadata,
    /// `(identifier, payload)` pairs for every embedded image.
    pub images: Vec<(String, ImagePayload)>,
}

/// A PDF-to-Markdown rendering engine.
///
/// Rendering is CPU-bound and synchronous; the orchestrator calls it to
/// completion before moving on, matching the strictly sequential batch
/// model.
pub trait Renderer: Send + Sync {
    fn render(&self, pdf_path: &Path) -> Result<RenderedDocument, DocError>;
}

/// Text-extraction renderer backed by the `pdf-extract` crate.
#[derive(Debug, Default)]
pub struct PdfExtractRenderer;

impl PdfExtractRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for PdfExtractRenderer {
    fn render(&self, pdf_path: &Path) -> Result<RenderedDocument, DocError> {
        let text = pdf_extract::extract_text(pdf_path).map_err(|e| DocError::RenderFailed {
            path: pdf_path.to_path_buf(),
            detail: e.to_string(),
        })?;

        debug!(
            "Extracted {} bytes of text from {}",
            text.len(),
            pdf_path.display()
        );

        Ok(RenderedDocument {
            markdown: text,
            metadata: RenderMetadata::default(),
            images: Vec::new(),
        })
    }
}
