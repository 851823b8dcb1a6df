//! CLI binary for mdbatch.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `BatchConfig` + `DocumentFilter` + `RunOptions` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mdbatch::{
    format_duration, load_config, normalize_existing, run_batch, verify_existing,
    BatchProgressCallback, DocumentFilter, PdfExtractRenderer, ProgressCallback, RunOptions,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar across the whole batch, one log
/// line per document.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} documents  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_docs: usize) {
        self.bar.set_length(total_docs as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_docs} document(s)…"))
        ));
    }

    fn on_document_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_document_complete(&self, index: usize, total: usize, name: &str, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} [{:>2}/{:<2}] {:<32} {}",
            green("✓"),
            index,
            total,
            name,
            dim(&format_duration(elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, name: &str, error: String) {
        let msg = truncate_message(&error);

        self.bar.println(format!(
            "  {} [{:>2}/{:<2}] {:<32} {}",
            red("✗"),
            index,
            total,
            name,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize) {
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} document(s) converted successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} document(s) converted  ({} failed)",
                if succeeded == 0 { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                succeeded + failed,
                red(&failed.to_string()),
            );
        }
    }
}

/// Truncate very long error messages to keep output tidy.
///
/// Counts characters, not bytes: error messages carry file names and
/// URLs, which are routinely non-ASCII.
fn truncate_message(error: &str) -> String {
    let mut msg: String = error.chars().take(79).collect();
    if msg.len() < error.len() {
        msg.push('\u{2026}');
    }
    msg
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every configured document
  mdbatch

  # Convert only the named documents
  mdbatch --files "Scrum Guide 2020" "Kanban Guide"

  # Convert every document carrying one of these version labels
  mdbatch --versions 2020 2021

  # Convert without the Markdown cleanup pass
  mdbatch --no-normalize

  # Re-clean already-generated files, no downloads
  mdbatch --normalize-only

  # Convert, then check that image links resolve
  mdbatch --verify

  # Only check image links of existing files
  mdbatch --verify-only

  # Use a different configuration file
  mdbatch --config corpus.json

CONFIGURATION (config.json):
  {
    "documents": [
      { "name": "Scrum Guide 2020",
        "url": "https://scrumguides.org/docs/scrumguide/v2020/2020-Scrum-Guide-US.pdf",
        "output_filename": "scrum-guide-2020.md",
        "version": "2020" }
    ],
    "output_dir": "docs",
    "image_dir": "docs/images",
    "temp_dir": "temp",
    "backup_dir": "backups",
    "download_timeout_secs": 60
  }

  Every generated file is backed up to backups/<name>.<YYYYMMDD_HHMMSS>.bak
  before any in-place rewrite.
"#;

/// Batch-convert configured PDF documents to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "mdbatch",
    version,
    about = "Batch-convert configured PDF documents to clean Markdown",
    long_about = "Convert a configured corpus of PDF documents (URLs or local files) to \
Markdown, with deterministic whitespace cleanup, image-reference reconciliation, and \
timestamped backups before every in-place rewrite.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, env = "MDBATCH_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Convert only documents with these names.
    #[arg(short, long, num_args = 1.., value_name = "NAME")]
    files: Vec<String>,

    /// Convert only documents with these version labels.
    #[arg(long, num_args = 1.., value_name = "VERSION", conflicts_with = "files")]
    versions: Vec<String>,

    /// Skip the Markdown cleanup pass after conversion.
    #[arg(long)]
    no_normalize: bool,

    /// Only normalize existing Markdown files; no downloads or rendering.
    #[arg(long, conflicts_with_all = ["no_normalize", "verify", "verify_only"])]
    normalize_only: bool,

    /// Verify image references after conversion.
    #[arg(long)]
    verify: bool,

    /// Only verify image references of existing files; no conversion.
    #[arg(long, conflicts_with = "verify")]
    verify_only: bool,

    /// Disable the progress bar.
    #[arg(long, env = "MDBATCH_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MDBATCH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MDBATCH_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.normalize_only && !cli.verify_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    // ── Normalize-only mode ──────────────────────────────────────────────
    if cli.normalize_only {
        let summary = normalize_existing(&config).context("Normalization failed")?;
        if !cli.quiet {
            eprintln!(
                "{} Normalized {} file(s): {} -> {} bytes ({} saved)",
                green("✔"),
                summary.files,
                summary.total_original_bytes,
                summary.total_new_bytes,
                bold(&summary.bytes_saved().to_string()),
            );
        }
        return Ok(());
    }

    // ── Verify-only mode ─────────────────────────────────────────────────
    if cli.verify_only {
        let reports = verify_existing(&config).context("Verification failed")?;
        let mut missing_total = 0usize;
        for report in &reports {
            if report.references.is_empty() {
                continue;
            }
            let tick = if report.is_clean() { green("✓") } else { red("✗") };
            eprintln!(
                "{} {:<32} {} reference(s), {} found, {} missing",
                tick,
                report.file_name,
                report.references.len(),
                report.found.len(),
                report.missing.len(),
            );
            for path in &report.missing {
                eprintln!("    {} {}", red("missing:"), path);
                missing_total += 1;
            }
        }
        if missing_total > 0 {
            anyhow::bail!("{missing_total} image reference(s) do not resolve");
        }
        if !cli.quiet {
            eprintln!("{} All image references resolve", green("✔"));
        }
        return Ok(());
    }

    // ── Convert mode ─────────────────────────────────────────────────────
    let filter = if !cli.files.is_empty() {
        DocumentFilter::ByName(cli.files.clone())
    } else if !cli.versions.is_empty() {
        DocumentFilter::ByVersion(cli.versions.clone())
    } else {
        DocumentFilter::All
    };

    let options = RunOptions {
        normalize: !cli.no_normalize,
        verify: cli.verify,
    };

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let renderer = PdfExtractRenderer::new();
    let summary = run_batch(&config, &filter, options, &renderer, progress)
        .await
        .context("Batch run failed")?;

    if !cli.quiet && !show_progress {
        eprintln!(
            "Converted {}/{} document(s) in {}",
            summary.succeeded(),
            summary.outcomes.len(),
            format_duration(summary.total_duration_ms as f64 / 1000.0),
        );
    }

    if !summary.is_success() {
        anyhow::bail!("{} document(s) failed", summary.failed());
    }

    Ok(())
}
