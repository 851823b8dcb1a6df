//! Configuration for a batch conversion run.
//!
//! All run behaviour is controlled through [`BatchConfig`], loaded from a
//! JSON file that enumerates the documents to convert plus a handful of
//! directory settings. Keeping every knob in one serialisable struct makes
//! it trivial to diff two runs to understand why their outputs differ.
//!
//! The directory fields all carry defaults so a minimal configuration is
//! just the document list:
//!
//! ```json
//! {
//!   "documents": [
//!     { "name": "Scrum Guide 2020",
//!       "url": "https://scrumguides.org/docs/scrumguide/v2020/2020-Scrum-Guide-US.pdf",
//!       "output_filename": "scrum-guide-2020.md",
//!       "version": "2020" }
//!   ]
//! }
//! ```

use crate::error::BatchError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One convertible unit: a named source PDF and its Markdown output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSpec {
    /// Human-readable name, used for selection (`--files`) and reporting.
    pub name: String,

    /// Source of the PDF: an HTTP/HTTPS URL or a local file path.
    pub url: String,

    /// File name of the generated Markdown, relative to `output_dir`.
    pub output_filename: String,

    /// Optional version label, used for selection (`--versions`).
    #[serde(default)]
    pub version: Option<String>,
}

impl DocumentSpec {
    /// Stem of the output file, used to name extracted images
    /// (`<stem>_image_<n>.png`).
    pub fn output_stem(&self) -> &str {
        Path::new(&self.output_filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.output_filename)
    }
}

/// Configuration for a batch run, loaded from JSON via [`load_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Documents to process, in configuration order.
    #[serde(alias = "pdfs")]
    pub documents: Vec<DocumentSpec>,

    /// Directory receiving the generated Markdown files. Default: `docs`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory receiving extracted images. Default: `docs/images`.
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Directory for temporary downloaded PDFs. Default: `temp`.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Directory receiving pre-rewrite backups. Default: `backups`.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// HTTP download timeout in seconds. Default: 60.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("docs/images")
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_download_timeout() -> u64 {
    60
}

impl BatchConfig {
    /// Prefix used for image links inside the generated Markdown.
    ///
    /// Links must be relative to the document's own directory, so when
    /// `image_dir` lives under `output_dir` (the default layout,
    /// `docs/images` under `docs`) the prefix is the remainder (`images`).
    /// Otherwise the full `image_dir` path is used as-is.
    pub fn image_link_prefix(&self) -> &Path {
        self.image_dir
            .strip_prefix(&self.output_dir)
            .unwrap_or(&self.image_dir)
    }

    /// Absolute-or-relative path of the Markdown output for one document.
    pub fn output_path(&self, doc: &DocumentSpec) -> PathBuf {
        self.output_dir.join(&doc.output_filename)
    }

    /// Create the output, image, temp, and backup directories.
    pub fn ensure_directories(&self) -> Result<(), BatchError> {
        for dir in [
            &self.output_dir,
            &self.image_dir,
            &self.temp_dir,
            &self.backup_dir,
        ] {
            std::fs::create_dir_all(dir).map_err(|e| BatchError::CreateDirFailed {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// Load and parse a [`BatchConfig`] from a JSON file.
///
/// Configuration failures are fatal: a missing or unparsable file aborts
/// the whole run, unlike per-document errors.
pub fn load_config(path: impl AsRef<Path>) -> Result<BatchConfig, BatchError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BatchError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            BatchError::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    serde_json::from_str(&text).map_err(|e| BatchError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Selects which configured documents a run processes.
#[derive(Debug, Clone, Default)]
pub enum DocumentFilter {
    /// Process every configured document (default).
    #[default]
    All,
    /// Process only documents whose `name` is listed.
    ByName(Vec<String>),
    /// Process only documents whose `version` is listed.
    ByVersion(Vec<String>),
}

impl DocumentFilter {
    /// Apply the filter, preserving configuration order.
    ///
    /// Names or versions that match no configured document are logged as
    /// warnings rather than treated as errors; an empty selection is the
    /// caller's fatal condition ([`BatchError::NoDocumentsSelected`]).
    pub fn select<'a>(&self, documents: &'a [DocumentSpec]) -> Vec<&'a DocumentSpec> {
        match self {
            DocumentFilter::All => documents.iter().collect(),
            DocumentFilter::ByName(names) => {
                let selected: Vec<&DocumentSpec> = documents
                    .iter()
                    .filter(|d| names.iter().any(|n| n == &d.name))
                    .collect();
                for name in names {
                    if !selected.iter().any(|d| &d.name == name) {
                        warn!("No configured document named '{}'", name);
                    }
                }
                selected
            }
            DocumentFilter::ByVersion(versions) => {
                let selected: Vec<&DocumentSpec> = documents
                    .iter()
                    .filter(|d| {
                        d.version
                            .as_ref()
                            .is_some_and(|v| versions.iter().any(|w| w == v))
                    })
                    .collect();
                for version in versions {
                    if !selected
                        .iter()
                        .any(|d| d.version.as_deref() == Some(version))
                    {
                        warn!("No configured document with version '{}'", version);
                    }
                }
                selected
            }
        }
    }
}

/// Per-run toggles mapped from the CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Normalize each generated Markdown file after conversion. Default: true.
    pub normalize: bool,
    /// Verify image references after each conversion. Default: false.
    pub verify: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            verify: false,
        }
    }
}
