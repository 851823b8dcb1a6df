//! Source resolution: bring a document's PDF bytes to a local temp path.
//!
//! A document source is either an HTTP/HTTPS URL (the normal case for a
//! corpus of published guides) or a local file path (useful in tests and
//! for re-converting an already-downloaded PDF). Both land at the caller's
//! destination path so the rest of the pipeline only ever sees a file.
//! The `%PDF` magic bytes are validated on both paths so callers get a
//! meaningful error rather than a renderer crash on an HTML error page.

use crate::error::DocError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Check if the source string looks like a URL.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetch `source` to `dest`.
///
/// URLs download with the given timeout; anything else is treated as a
/// local file path and copied. Network errors (timeout, connection
/// failure, non-success HTTP status) surface unmodified as [`DocError`];
/// there is no retry.
pub async fn fetch_document(
    source: &str,
    dest: &Path,
    timeout_secs: u64,
) -> Result<(), DocError> {
    if is_url(source) {
        download_url(source, dest, timeout_secs).await
    } else {
        copy_local(source, dest)
    }
}

fn copy_local(source: &str, dest: &Path) -> Result<(), DocError> {
    let path = PathBuf::from(source);
    if !path.exists() {
        return Err(DocError::FileNotFound { path });
    }

    let bytes = std::fs::read(&path).map_err(|e| DocError::ReadFailed {
        path: path.clone(),
        source: e,
    })?;
    validate_magic(&bytes, &path)?;

    std::fs::write(dest, &bytes).map_err(|e| DocError::OutputWriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })?;

    debug!("Copied local PDF {} -> {}", path.display(), dest.display());
    Ok(())
}

async fn download_url(url: &str, dest: &Path, timeout_secs: u64) -> Result<(), DocError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DocError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            DocError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            DocError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(DocError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            DocError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            DocError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    // Name the URL, not dest: nothing has been written there yet.
    validate_magic(&bytes, Path::new(url))?;

    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| DocError::OutputWriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

    info!(
        "Downloaded {:.2} MB to {}",
        bytes.len() as f64 / (1024.0 * 1024.0),
        dest.display()
    );
    Ok(())
}

fn validate_magic(bytes: &[u8], path: &Path) -> Result<(), DocError> {
    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(DocError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[tokio::test]
    async fn local_copy_lands_at_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.pdf");
        let dest = dir.path().join("out.pdf");
        std::fs::write(&src, b"%PDF-1.4 fake body").unwrap();

        fetch_document(src.to_str().unwrap(), &dest, 5).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.4 fake body");
    }

    #[tokio::test]
    async fn local_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.pdf");
        let err = fetch_document("/no/such/file.pdf", &dest, 5).await.unwrap_err();
        assert!(matches!(err, DocError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn non_pdf_bytes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.pdf");
        let dest = dir.path().join("out.pdf");
        std::fs::write(&src, b"<html>not found</html>").unwrap();

        let err = fetch_document(src.to_str().unwrap(), &dest, 5).await.unwrap_err();
        assert!(matches!(err, DocError::NotAPdf { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn magic_failure_names_the_checked_source() {
        // The download path validates before writing, so the error must
        // point at the URL rather than the not-yet-written destination.
        let url = Path::new("https://example.org/guide.pdf");
        let err = validate_magic(b"<html>not found</html>", url).unwrap_err();
        match err {
            DocError::NotAPdf { path, magic } => {
                assert_eq!(path, url);
                assert_eq!(&magic, b"<htm");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
