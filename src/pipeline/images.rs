//! Image persistence and reference reconciliation.
//!
//! The rendering engine names embedded images with opaque identifiers
//! (e.g. `_page_3_Picture_1.jpeg`) and emits Markdown referencing them as
//! `![](<identifier>)`. This module gives each payload a deterministic
//! on-disk name, writes it out, and rewrites the Markdown references to
//! point at the saved files.
//!
//! Payloads arrive in two shapes, modelled as an explicit tagged union:
//! already-encoded bytes are written verbatim, decoded raster images are
//! PNG-encoded through the `image` crate.

use crate::error::DocError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// An image emitted by the rendering engine.
pub enum ImagePayload {
    /// Raw encoded bytes, written to disk as-is.
    Encoded(Vec<u8>),
    /// A decoded raster image, PNG-encoded on save.
    Decoded(image::DynamicImage),
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImagePayload::Encoded(bytes) => {
                f.debug_tuple("Encoded").field(&bytes.len()).finish()
            }
            ImagePayload::Decoded(img) => f
                .debug_tuple("Decoded")
                .field(&(img.width(), img.height()))
                .finish(),
        }
    }
}

impl ImagePayload {
    /// Persist the payload to `path`.
    pub fn persist(&self, path: &Path) -> Result<(), DocError> {
        match self {
            ImagePayload::Encoded(bytes) => {
                std::fs::write(path, bytes).map_err(|e| DocError::ImageSaveFailed {
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                })
            }
            ImagePayload::Decoded(img) => {
                img.save_with_format(path, image::ImageFormat::Png)
                    .map_err(|e| DocError::ImageSaveFailed {
                        path: path.to_path_buf(),
                        detail: e.to_string(),
                    })
            }
        }
    }
}

/// Identifier → relative-link pairs for one document, in save order.
pub type ImageMapping = Vec<(String, String)>;

/// Save every payload under `image_dir` and build the reference mapping.
///
/// Files are named `<doc_stem>_image_<n>.png` with a 1-based index in the
/// iteration order of `images` — stable only if the renderer's own order
/// is stable. The returned mapping links each renderer identifier to
/// `<link_prefix>/<filename>`, the path a Markdown document in the output
/// directory should use.
pub fn save_images(
    images: &[(String, ImagePayload)],
    image_dir: &Path,
    doc_stem: &str,
    link_prefix: &Path,
) -> Result<ImageMapping, DocError> {
    if images.is_empty() {
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(image_dir).map_err(|e| DocError::ImageSaveFailed {
        path: image_dir.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut mapping = Vec::with_capacity(images.len());
    for (idx, (identifier, payload)) in images.iter().enumerate() {
        let filename = format!("{}_image_{}.png", doc_stem, idx + 1);
        let path = image_dir.join(&filename);
        payload.persist(&path)?;
        debug!("Saved image {} -> {}", identifier, path.display());

        let link = link_prefix.join(&filename).to_string_lossy().into_owned();
        mapping.push((identifier.clone(), link));
    }

    Ok(mapping)
}

/// Bare image reference as the renderer emits it: `![](<identifier>)`.
static RE_BARE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[\]\(([^)]+)\)").unwrap());

/// Rewrite `![](<identifier>)` references to `![<identifier>](<path>)`.
///
/// Identifiers are matched as literal text (escaped with [`regex::escape`]),
/// never as pattern syntax; `.` and friends in renderer identifiers are
/// common. Text outside the exact bracket form is untouched, and an empty
/// mapping returns the input unchanged.
pub fn reconcile(markdown: &str, mapping: &ImageMapping) -> String {
    if mapping.is_empty() {
        return markdown.to_string();
    }

    let mut content = markdown.to_string();
    for (identifier, link) in mapping {
        let pattern = format!(r"!\[\]\({}\)", regex::escape(identifier));
        // Identifiers are literal strings, so compilation cannot fail;
        // fall through untouched if one somehow does.
        if let Ok(re) = Regex::new(&pattern) {
            let replacement = format!("![{identifier}]({link})");
            content = re
                .replace_all(&content, regex::NoExpand(&replacement))
                .into_owned();
        }
    }
    content
}

/// Count bare `![](...)` references left after reconciliation.
///
/// A non-zero count after rewriting means the renderer referenced an
/// image it never handed over as a payload.
pub fn count_unresolved_refs(markdown: &str) -> usize {
    RE_BARE_REF.find_iter(markdown).count()
}
