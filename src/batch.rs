//! Batch orchestration: drive each configured document through the
//! pipeline and aggregate the outcome.
//!
//! Processing is strictly sequential — one document at a time, each step
//! run to completion before the next starts. A step failure marks that
//! document as failed and the batch moves on; only configuration-level
//! problems abort the run. The temporary downloaded PDF is removed on
//! success and failure alike.
//!
//! Two additional entry points operate on already-generated files without
//! fetching or rendering: [`normalize_existing`] and [`verify_existing`].

use crate::config::{BatchConfig, DocumentFilter, DocumentSpec, RunOptions};
use crate::error::{BatchError, DocError};
use crate::pipeline::{fetch, images, normalize, verify};
use crate::progress::ProgressCallback;
use crate::render::Renderer;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of one document's trip through the pipeline.
#[derive(Debug)]
pub struct DocOutcome {
    pub name: String,
    pub elapsed_ms: u64,
    /// `None` on success, the rendered error on failure.
    pub error: Option<String>,
}

impl DocOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate result of a batch run.
#[derive(Debug)]
pub struct BatchSummary {
    /// Per-document outcomes, in processing order.
    pub outcomes: Vec<DocOutcome>,
    pub total_duration_ms: u64,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// True when every selected document converted.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Convert every selected document: fetch → render → images → write →
/// normalize → verify.
///
/// Fatal ([`BatchError`]) only for configuration problems: an empty
/// document list, a filter that selects nothing, or unusable working
/// directories. Per-document failures are caught at the document
/// boundary, reported through `progress`, and recorded in the summary.
pub async fn run_batch(
    config: &BatchConfig,
    filter: &DocumentFilter,
    options: RunOptions,
    renderer: &dyn Renderer,
    progress: Option<ProgressCallback>,
) -> Result<BatchSummary, BatchError> {
    if config.documents.is_empty() {
        return Err(BatchError::NoDocumentsConfigured);
    }

    let selected = filter.select(&config.documents);
    if selected.is_empty() {
        return Err(BatchError::NoDocumentsSelected);
    }

    config.ensure_directories()?;

    let total = selected.len();
    let batch_start = Instant::now();
    info!("Processing {} document(s)", total);

    if let Some(ref cb) = progress {
        cb.on_batch_start(total);
    }

    let mut outcomes = Vec::with_capacity(total);
    for (i, doc) in selected.iter().enumerate() {
        let index = i + 1;
        if let Some(ref cb) = progress {
            cb.on_document_start(index, total, &doc.name);
        }

        let doc_start = Instant::now();
        let result = process_document(doc, index, config, options, renderer).await;
        let elapsed_ms = doc_start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                info!(
                    "Completed '{}' in {}",
                    doc.name,
                    format_duration(elapsed_ms as f64 / 1000.0)
                );
                if let Some(ref cb) = progress {
                    cb.on_document_complete(index, total, &doc.name, elapsed_ms);
                }
                outcomes.push(DocOutcome {
                    name: doc.name.clone(),
                    elapsed_ms,
                    error: None,
                });
            }
            Err(e) => {
                warn!("Failed '{}': {}", doc.name, e);
                if let Some(ref cb) = progress {
                    cb.on_document_error(index, total, &doc.name, e.to_string());
                }
                outcomes.push(DocOutcome {
                    name: doc.name.clone(),
                    elapsed_ms,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    // An empty temp directory has no reason to outlive the run.
    if std::fs::read_dir(&config.temp_dir)
        .map(|mut d| d.next().is_none())
        .unwrap_or(false)
    {
        std::fs::remove_dir(&config.temp_dir).ok();
    }

    let summary = BatchSummary {
        outcomes,
        total_duration_ms: batch_start.elapsed().as_millis() as u64,
    };

    if let Some(ref cb) = progress {
        cb.on_batch_complete(summary.succeeded(), summary.failed());
    }

    Ok(summary)
}

/// Run one document through the pipeline, removing the temp PDF on both
/// the success and the failure path.
async fn process_document(
    doc: &DocumentSpec,
    index: usize,
    config: &BatchConfig,
    options: RunOptions,
    renderer: &dyn Renderer,
) -> Result<(), DocError> {
    let temp_pdf = config.temp_dir.join(format!("temp_{index}.pdf"));
    let result = convert_document(doc, &temp_pdf, config, options, renderer).await;

    if temp_pdf.exists() {
        std::fs::remove_file(&temp_pdf).ok();
    }

    result
}

async fn convert_document(
    doc: &DocumentSpec,
    temp_pdf: &Path,
    config: &BatchConfig,
    options: RunOptions,
    renderer: &dyn Renderer,
) -> Result<(), DocError> {
    let output_md = config.output_path(doc);

    // ── Fetch ────────────────────────────────────────────────────────────
    let fetch_start = Instant::now();
    fetch::fetch_document(&doc.url, temp_pdf, config.download_timeout_secs).await?;
    info!(
        "Fetched '{}' in {}",
        doc.name,
        format_duration(fetch_start.elapsed().as_secs_f64())
    );

    // ── Render ───────────────────────────────────────────────────────────
    let render_start = Instant::now();
    let rendered = renderer.render(temp_pdf)?;
    info!(
        "Rendered '{}' in {}{}",
        doc.name,
        format_duration(render_start.elapsed().as_secs_f64()),
        rendered
            .metadata
            .pages
            .map(|p| format!(" ({p} pages)"))
            .unwrap_or_default()
    );

    // ── Save images, reconcile references ────────────────────────────────
    let mapping = images::save_images(
        &rendered.images,
        &config.image_dir,
        doc.output_stem(),
        config.image_link_prefix(),
    )?;
    if !mapping.is_empty() {
        info!("Saved {} image(s) for '{}'", mapping.len(), doc.name);
    }
    let markdown = images::reconcile(&rendered.markdown, &mapping);

    let unresolved = images::count_unresolved_refs(&markdown);
    if unresolved > 0 {
        warn!(
            "'{}' references {} image(s) the renderer did not provide",
            doc.name, unresolved
        );
    }

    std::fs::write(&output_md, &markdown).map_err(|e| DocError::OutputWriteFailed {
        path: output_md.clone(),
        source: e,
    })?;
    info!("Wrote {}", output_md.display());

    // ── Normalize (skippable) ────────────────────────────────────────────
    if options.normalize {
        let (original, new) = normalize::normalize_file(&output_md, &config.backup_dir)?;
        if original > 0 {
            let reduction = original.saturating_sub(new);
            info!(
                "Normalized {}: {} -> {} bytes ({:.1}% saved)",
                output_md.display(),
                original,
                new,
                reduction as f64 / original as f64 * 100.0
            );
        }
    }

    // ── Verify (skippable) ───────────────────────────────────────────────
    if options.verify {
        let report = verify::verify_images(&output_md, &config.image_dir)?;
        if report.references.is_empty() {
            info!("'{}': no image references", doc.name);
        } else {
            info!(
                "'{}': {} image reference(s), {} found, {} missing",
                doc.name,
                report.references.len(),
                report.found.len(),
                report.missing.len()
            );
            for missing in &report.missing {
                warn!("  missing: {}", missing);
            }
        }
    }

    Ok(())
}

/// Aggregate result of a normalize-only pass.
#[derive(Debug, Default)]
pub struct NormalizeSummary {
    pub files: usize,
    pub total_original_bytes: u64,
    pub total_new_bytes: u64,
}

impl NormalizeSummary {
    pub fn bytes_saved(&self) -> u64 {
        self.total_original_bytes
            .saturating_sub(self.total_new_bytes)
    }
}

/// Normalize every Markdown file already in `output_dir`, without
/// fetching or rendering anything.
///
/// Each file is backed up before its in-place rewrite. A missing output
/// directory or an empty one is fatal — there is nothing to do.
pub fn normalize_existing(config: &BatchConfig) -> Result<NormalizeSummary, BatchError> {
    let files = list_markdown_files(&config.output_dir)?;

    let mut summary = NormalizeSummary::default();
    for file in &files {
        let (original, new) = normalize::normalize_file(file, &config.backup_dir)
            .map_err(|e| BatchError::Internal(e.to_string()))?;
        summary.files += 1;
        summary.total_original_bytes += original;
        summary.total_new_bytes += new;
        if original > 0 {
            info!(
                "Normalized {}: {} -> {} bytes",
                file.display(),
                original,
                new
            );
        }
    }

    Ok(summary)
}

/// Verify image references of every Markdown file in `output_dir`.
pub fn verify_existing(
    config: &BatchConfig,
) -> Result<Vec<verify::VerificationReport>, BatchError> {
    let files = list_markdown_files(&config.output_dir)?;

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        let report = verify::verify_images(file, &config.image_dir)
            .map_err(|e| BatchError::Internal(e.to_string()))?;
        reports.push(report);
    }

    Ok(reports)
}

/// Sorted list of `*.md` files directly under `dir`.
///
/// Fatal if the directory does not exist or holds no Markdown files.
fn list_markdown_files(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.exists() {
        return Err(BatchError::OutputDirMissing {
            path: dir.to_path_buf(),
        });
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| BatchError::CreateDirFailed {
            path: dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(BatchError::NoMarkdownFiles {
            path: dir.to_path_buf(),
        });
    }

    Ok(files)
}

/// Render a duration in seconds as a human-readable string.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.1}s")
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else {
        format!("{:.1}h", seconds / 3600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_seconds() {
        assert_eq!(format_duration(12.34), "12.3s");
        assert_eq!(format_duration(0.0), "0.0s");
    }

    #[test]
    fn format_duration_minutes() {
        assert_eq!(format_duration(90.0), "1.5m");
        assert_eq!(format_duration(3599.0), "60.0m");
    }

    #[test]
    fn format_duration_hours() {
        assert_eq!(format_duration(5400.0), "1.5h");
    }

    #[test]
    fn summary_counts_outcomes() {
        let summary = BatchSummary {
            outcomes: vec![
                DocOutcome {
                    name: "A".into(),
                    elapsed_ms: 10,
                    error: None,
                },
                DocOutcome {
                    name: "B".into(),
                    elapsed_ms: 20,
                    error: Some("HTTP 404".into()),
                },
            ],
            total_duration_ms: 30,
        };
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.is_success());
    }

    #[test]
    fn list_markdown_files_missing_dir_is_fatal() {
        let err = list_markdown_files(Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, BatchError::OutputDirMissing { .. }));
    }

    #[test]
    fn list_markdown_files_sorted_md_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "b").unwrap();
        std::fs::write(dir.path().join("a.md"), "a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = list_markdown_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[test]
    fn list_markdown_files_empty_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_markdown_files(dir.path()).unwrap_err();
        assert!(matches!(err, BatchError::NoMarkdownFiles { .. }));
    }
}
