//! Integration tests for the batch orchestrator.
//!
//! These run the whole pipeline against local fake PDFs (the `%PDF` magic
//! is all the fetch stage checks) with a stub rendering engine, so they
//! need no network and no real PDF parser. One live-download test at the
//! bottom is gated behind the `E2E_ENABLED` environment variable.

use mdbatch::{
    run_batch, BatchConfig, BatchError, BatchProgressCallback, DocError, DocumentFilter,
    ImagePayload, RenderMetadata, RenderedDocument, Renderer, RunOptions,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A renderer that returns canned Markdown (with messy whitespace and a
/// bare image reference) plus one encoded image payload.
struct StubRenderer {
    calls: AtomicUsize,
}

impl StubRenderer {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl Renderer for StubRenderer {
    fn render(&self, _pdf_path: &Path) -> Result<RenderedDocument, DocError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RenderedDocument {
            markdown: "# Guide   \n\n\n\n\nSee the figure: ![](fig_0.jpeg)\n\n\n".to_string(),
            metadata: RenderMetadata { pages: Some(3) },
            images: vec![(
                "fig_0.jpeg".to_string(),
                ImagePayload::Encoded(vec![0x89, b'P', b'N', b'G']),
            )],
        })
    }
}

/// A renderer that always fails, for failure-isolation tests.
struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn render(&self, pdf_path: &Path) -> Result<RenderedDocument, DocError> {
        Err(DocError::RenderFailed {
            path: pdf_path.to_path_buf(),
            detail: "engine exploded".to_string(),
        })
    }
}

/// Write a fake PDF (valid magic, junk body) and return its path.
fn write_fake_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4\njunk body\n%%EOF").unwrap();
    path
}

/// Config rooted in `dir` with one document per `(name, source)` pair.
fn config_in(dir: &Path, docs: &[(&str, &str)]) -> BatchConfig {
    let json = serde_json::json!({
        "documents": docs.iter().map(|(name, url)| {
            serde_json::json!({
                "name": name,
                "url": url,
                "output_filename": format!("{}.md", name.to_lowercase().replace(' ', "-")),
            })
        }).collect::<Vec<_>>(),
        "output_dir": dir.join("docs"),
        "image_dir": dir.join("docs/images"),
        "temp_dir": dir.join("temp"),
        "backup_dir": dir.join("backups"),
    });
    serde_json::from_value(json).unwrap()
}

// ── Full-pipeline tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn converts_writes_normalizes_and_reconciles() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf = write_fake_pdf(tmp.path(), "guide.pdf");
    let config = config_in(tmp.path(), &[("Test Guide", pdf.to_str().unwrap())]);

    let renderer = StubRenderer::new();
    let summary = run_batch(
        &config,
        &DocumentFilter::All,
        RunOptions::default(),
        &renderer,
        None,
    )
    .await
    .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);

    // Normalized output: trailing spaces gone, blank runs capped at two,
    // single trailing newline.
    let md = std::fs::read_to_string(tmp.path().join("docs/test-guide.md")).unwrap();
    assert!(md.starts_with("# Guide\n\n\nSee the figure:"), "got: {md:?}");
    assert!(md.ends_with(")\n"), "got: {md:?}");
    assert!(!md.contains("   \n"));

    // The bare reference was reconciled against the saved payload.
    assert!(md.contains("![fig_0.jpeg](images/test-guide_image_1.png)"));
    assert!(!md.contains("![]("));
    assert!(tmp.path().join("docs/images/test-guide_image_1.png").exists());
}

#[tokio::test]
async fn temp_pdf_removed_on_success_and_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf = write_fake_pdf(tmp.path(), "guide.pdf");
    let config = config_in(tmp.path(), &[("Guide", pdf.to_str().unwrap())]);

    run_batch(
        &config,
        &DocumentFilter::All,
        RunOptions::default(),
        &StubRenderer::new(),
        None,
    )
    .await
    .unwrap();
    assert!(!tmp.path().join("temp/temp_1.pdf").exists());

    let summary = run_batch(
        &config,
        &DocumentFilter::All,
        RunOptions::default(),
        &FailingRenderer,
        None,
    )
    .await
    .unwrap();
    assert_eq!(summary.failed(), 1);
    assert!(!tmp.path().join("temp/temp_1.pdf").exists());
}

#[tokio::test]
async fn one_bad_document_does_not_stop_the_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let good = write_fake_pdf(tmp.path(), "good.pdf");
    let config = config_in(
        tmp.path(),
        &[
            ("Missing", "/no/such/source.pdf"),
            ("Good", good.to_str().unwrap()),
        ],
    );

    let summary = run_batch(
        &config,
        &DocumentFilter::All,
        RunOptions::default(),
        &StubRenderer::new(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 1);
    assert!(summary.outcomes[0].error.is_some());
    assert_eq!(summary.outcomes[1].name, "Good");
    assert!(summary.outcomes[1].is_success());
    assert!(tmp.path().join("docs/good.md").exists());
}

#[tokio::test]
async fn empty_selection_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf = write_fake_pdf(tmp.path(), "guide.pdf");
    let config = config_in(tmp.path(), &[("Guide", pdf.to_str().unwrap())]);

    let err = run_batch(
        &config,
        &DocumentFilter::ByName(vec!["Nonexistent".to_string()]),
        RunOptions::default(),
        &StubRenderer::new(),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, BatchError::NoDocumentsSelected));
}

#[tokio::test]
async fn no_normalize_keeps_raw_output() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf = write_fake_pdf(tmp.path(), "guide.pdf");
    let config = config_in(tmp.path(), &[("Guide", pdf.to_str().unwrap())]);

    run_batch(
        &config,
        &DocumentFilter::All,
        RunOptions {
            normalize: false,
            verify: false,
        },
        &StubRenderer::new(),
        None,
    )
    .await
    .unwrap();

    // Raw renderer output survives: trailing spaces and the long blank run.
    let md = std::fs::read_to_string(tmp.path().join("docs/guide.md")).unwrap();
    assert!(md.contains("# Guide   \n"));
    // No normalization means no backup either.
    assert_eq!(std::fs::read_dir(tmp.path().join("backups")).unwrap().count(), 0);
}

#[tokio::test]
async fn normalization_leaves_a_backup() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf = write_fake_pdf(tmp.path(), "guide.pdf");
    let config = config_in(tmp.path(), &[("Guide", pdf.to_str().unwrap())]);

    run_batch(
        &config,
        &DocumentFilter::All,
        RunOptions::default(),
        &StubRenderer::new(),
        None,
    )
    .await
    .unwrap();

    let backups: Vec<_> = std::fs::read_dir(tmp.path().join("backups"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with("guide.md."));
    assert!(backups[0].ends_with(".bak"));
}

#[tokio::test]
async fn progress_callback_sees_every_document() {
    struct Counter {
        completes: AtomicUsize,
        errors: AtomicUsize,
    }
    impl BatchProgressCallback for Counter {
        fn on_document_complete(&self, _i: usize, _t: usize, _n: &str, _ms: u64) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        fn on_document_error(&self, _i: usize, _t: usize, _n: &str, _e: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    let tmp = tempfile::tempdir().unwrap();
    let pdf = write_fake_pdf(tmp.path(), "guide.pdf");
    let config = config_in(
        tmp.path(),
        &[
            ("Guide", pdf.to_str().unwrap()),
            ("Broken", "/no/such/file.pdf"),
        ],
    );

    let counter = Arc::new(Counter {
        completes: AtomicUsize::new(0),
        errors: AtomicUsize::new(0),
    });
    run_batch(
        &config,
        &DocumentFilter::All,
        RunOptions::default(),
        &StubRenderer::new(),
        Some(counter.clone() as Arc<dyn BatchProgressCallback>),
    )
    .await
    .unwrap();

    assert_eq!(counter.completes.load(Ordering::SeqCst), 1);
    assert_eq!(counter.errors.load(Ordering::SeqCst), 1);
}

// ── Standalone normalize / verify modes ──────────────────────────────────────

#[test]
fn normalize_existing_cleans_and_reports_sizes() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path(), &[("Unused", "x")]);
    std::fs::create_dir_all(&config.output_dir).unwrap();
    std::fs::write(
        config.output_dir.join("a.md"),
        "# A  \n\n\n\n\nBody\n\n\n",
    )
    .unwrap();
    std::fs::write(config.output_dir.join("b.md"), "clean\n").unwrap();

    let summary = mdbatch::normalize_existing(&config).unwrap();
    assert_eq!(summary.files, 2);
    assert!(summary.total_new_bytes < summary.total_original_bytes);

    let a = std::fs::read_to_string(config.output_dir.join("a.md")).unwrap();
    assert_eq!(a, "# A\n\n\nBody\n");
}

#[test]
fn normalize_existing_counts_zero_byte_files() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path(), &[("Unused", "x")]);
    std::fs::create_dir_all(&config.output_dir).unwrap();
    std::fs::write(config.output_dir.join("empty.md"), "").unwrap();
    std::fs::write(config.output_dir.join("full.md"), "text   \n\n\n\n\nmore\n").unwrap();

    let summary = mdbatch::normalize_existing(&config).unwrap();
    assert_eq!(summary.files, 2);

    // The empty file was still rewritten to a single newline.
    assert_eq!(
        std::fs::read_to_string(config.output_dir.join("empty.md")).unwrap(),
        "\n"
    );
}

#[test]
fn normalize_existing_missing_dir_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path(), &[("Unused", "x")]);
    let err = mdbatch::normalize_existing(&config).unwrap_err();
    assert!(matches!(err, BatchError::OutputDirMissing { .. }));
}

#[test]
fn verify_existing_reports_missing_references() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path(), &[("Unused", "x")]);
    std::fs::create_dir_all(&config.image_dir).unwrap();
    std::fs::write(config.image_dir.join("a_image_1.png"), b"png").unwrap();
    std::fs::write(
        config.output_dir.join("a.md"),
        "![one](images/a_image_1.png)\n![two](images/a_image_2.png)\n",
    )
    .unwrap();

    let reports = mdbatch::verify_existing(&config).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].found, vec!["images/a_image_1.png"]);
    assert_eq!(reports[0].missing, vec!["images/a_image_2.png"]);
    assert!(!reports[0].is_clean());
}

// ── Live-download test (opt-in) ──────────────────────────────────────────────

/// Downloads the 2020 Scrum Guide and runs it through the stub renderer.
/// Set `E2E_ENABLED=1` to run; skipped otherwise so CI stays offline.
#[tokio::test]
async fn e2e_download_real_pdf() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(
        tmp.path(),
        &[(
            "Scrum Guide 2020",
            "https://scrumguides.org/docs/scrumguide/v2020/2020-Scrum-Guide-US.pdf",
        )],
    );

    let summary = run_batch(
        &config,
        &DocumentFilter::All,
        RunOptions::default(),
        &StubRenderer::new(),
        None,
    )
    .await
    .unwrap();

    assert!(summary.is_success(), "outcomes: {:?}", summary.outcomes);
    assert!(tmp.path().join("docs/scrum-guide-2020.md").exists());
}
