//! Image-reference verification for generated Markdown.
//!
//! After conversion the Markdown references images by relative path; this
//! pass confirms every referenced file actually exists on disk. Paths
//! resolve relative to the directory containing the Markdown document —
//! the same way a Markdown renderer resolves them.

use crate::error::DocError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Image markup with alt text and path: `![alt](path)`.
static RE_IMAGE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// Result of verifying one Markdown document.
///
/// Transient: recomputed on every pass, never persisted. Lists preserve
/// encounter order and keep duplicates — a document referencing the same
/// missing image twice reports it twice.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    /// File name of the verified document.
    pub file_name: String,
    /// Every `(alt, path)` reference, in encounter order.
    pub references: Vec<(String, String)>,
    /// Referenced paths that resolve to an existing file.
    pub found: Vec<String>,
    /// Referenced paths that do not.
    pub missing: Vec<String>,
}

impl VerificationReport {
    /// True when every reference resolved (also true for zero references).
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Scan `markdown_path` for image references and classify each as found
/// or missing.
///
/// `image_dir` is informational: it names where the batch writes images,
/// but resolution is always relative to the document's own directory.
/// Missing image files never error; only an unreadable `markdown_path`
/// does.
pub fn verify_images(
    markdown_path: impl AsRef<Path>,
    image_dir: impl AsRef<Path>,
) -> Result<VerificationReport, DocError> {
    let markdown_path = markdown_path.as_ref();
    debug!(
        "Verifying image references in {} (image dir: {})",
        markdown_path.display(),
        image_dir.as_ref().display()
    );

    let content = std::fs::read_to_string(markdown_path).map_err(|e| DocError::ReadFailed {
        path: markdown_path.to_path_buf(),
        source: e,
    })?;

    let doc_dir = markdown_path.parent().unwrap_or(Path::new(""));

    let mut report = VerificationReport {
        file_name: markdown_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        ..Default::default()
    };

    for caps in RE_IMAGE_REF.captures_iter(&content) {
        let alt = caps[1].to_string();
        let path = caps[2].to_string();
        let resolved: PathBuf = doc_dir.join(&path);

        if resolved.exists() {
            report.found.push(path.clone());
        } else {
            report.missing.push(path.clone());
        }
        report.references.push((alt, path));
    }

    Ok(report)
}
