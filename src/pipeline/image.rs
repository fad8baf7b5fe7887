//! Image resolution: turn a markdown image reference into raw bytes.
//!
//! A reference is tried, first match wins, as:
//!
//! 1. an embedded `data:image/...;base64,` URI, decoded in memory, never
//!    touching the network or the filesystem;
//! 2. an `http://` / `https://` URL, fetched with a bounded timeout;
//! 3. a filesystem path, as given first, then relative to the directory of
//!    the notebook that references it.
//!
//! Every failure is returned to the caller, which decides whether to skip the
//! image.

use crate::error::ImageError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Check if the reference looks like a URL.
pub fn is_url(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Check if the reference is an embedded image.
pub fn is_data_uri(reference: &str) -> bool {
    reference.starts_with("data:image/")
}

/// Decode the base64 payload of a `data:image/...` URI.
pub fn decode_data_uri(reference: &str) -> Result<Vec<u8>, ImageError> {
    let (_, payload) = reference
        .split_once(',')
        .ok_or_else(|| ImageError::InvalidDataUri {
            reason: "missing ',' before the payload".into(),
        })?;
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| ImageError::InvalidDataUri {
            reason: e.to_string(),
        })
}

/// Resolves image references to bytes.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl ImageResolver {
    /// Create a resolver whose remote fetches time out after `timeout_secs`.
    pub fn new(timeout_secs: u64) -> Result<Self, ImageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ImageError::FetchFailed {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }

    /// Resolve `reference` to image bytes.
    ///
    /// `source_document` is the notebook the reference appears in; relative
    /// paths that don't exist as given are retried against its directory.
    pub async fn resolve(
        &self,
        reference: &str,
        source_document: Option<&Path>,
    ) -> Result<Vec<u8>, ImageError> {
        let reference = reference.trim();
        if is_data_uri(reference) {
            decode_data_uri(reference)
        } else if is_url(reference) {
            self.fetch(reference).await
        } else {
            resolve_local(reference, source_document).await
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        debug!("Fetching image: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ImageError::FetchTimeout {
                    url: url.to_string(),
                    secs: self.timeout_secs,
                }
            } else {
                ImageError::FetchFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(ImageError::FetchFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| ImageError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

/// Read a local image, as given first and then next to the notebook.
async fn resolve_local(
    reference: &str,
    source_document: Option<&Path>,
) -> Result<Vec<u8>, ImageError> {
    let mut tried = Vec::with_capacity(2);

    let as_given = PathBuf::from(reference);
    if as_given.exists() {
        return read_image(&as_given).await;
    }
    tried.push(as_given);

    if let Some(document) = source_document {
        let notebook_dir = notebook_dir(document);
        let relative = notebook_dir.join(reference);
        if relative.exists() {
            debug!("Resolved '{}' relative to {}", reference, notebook_dir.display());
            return read_image(&relative).await;
        }
        tried.push(relative);
    }

    Err(ImageError::NotFound {
        reference: reference.to_string(),
        tried,
    })
}

/// Absolute directory containing the notebook.
fn notebook_dir(document: &Path) -> PathBuf {
    let absolute = std::path::absolute(document).unwrap_or_else(|_| document.to_path_buf());
    absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

async fn read_image(path: &Path) -> Result<Vec<u8>, ImageError> {
    tokio::fs::read(path).await.map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/a.png"));
        assert!(is_url("http://example.com/a.png"));
        assert!(!is_url("/tmp/a.png"));
        assert!(!is_url("a.png"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_is_data_uri() {
        assert!(is_data_uri("data:image/png;base64,AAAA"));
        assert!(!is_data_uri("data:text/plain;base64,AAAA"));
    }

    #[tokio::test]
    async fn data_uri_is_decoded_without_io() {
        let resolver = ImageResolver::new(30).unwrap();
        // A notebook path that doesn't exist proves no filesystem lookup happens.
        let bytes = resolver
            .resolve(
                "data:image/png;base64,aGVs\nbG8=",
                Some(Path::new("/no/such/dir/nb.ipynb")),
            )
            .await
            .unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn malformed_data_uri_is_rejected() {
        assert!(matches!(
            decode_data_uri("data:image/png;base64"),
            Err(ImageError::InvalidDataUri { .. })
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64,@@@"),
            Err(ImageError::InvalidDataUri { .. })
        ));
    }

    #[tokio::test]
    async fn relative_path_falls_back_to_notebook_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("figs")).unwrap();
        std::fs::write(dir.path().join("figs/plot.png"), b"png-bytes").unwrap();
        let notebook = dir.path().join("nb.ipynb");

        let resolver = ImageResolver::new(30).unwrap();
        let bytes = resolver
            .resolve("figs/plot.png", Some(notebook.as_path()))
            .await
            .unwrap();
        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn absolute_path_is_read_directly() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("a.png");
        std::fs::write(&img, b"abs").unwrap();

        let resolver = ImageResolver::new(30).unwrap();
        let bytes = resolver.resolve(img.to_str().unwrap(), None).await.unwrap();
        assert_eq!(bytes, b"abs");
    }

    #[tokio::test]
    async fn missing_file_names_both_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let notebook = dir.path().join("nb.ipynb");

        let resolver = ImageResolver::new(30).unwrap();
        match resolver.resolve("missing.png", Some(notebook.as_path())).await {
            Err(ImageError::NotFound { tried, .. }) => {
                assert_eq!(tried.len(), 2);
                assert_eq!(tried[0], PathBuf::from("missing.png"));
                assert!(tried[1].ends_with("missing.png"));
                assert!(tried[1].is_absolute());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_without_notebook_tries_once() {
        let resolver = ImageResolver::new(30).unwrap();
        match resolver.resolve("missing.png", None).await {
            Err(ImageError::NotFound { tried, .. }) => assert_eq!(tried.len(), 1),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn remote_image_is_fetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"remote".to_vec()))
            .mount(&server)
            .await;

        let resolver = ImageResolver::new(30).unwrap();
        let bytes = resolver
            .resolve(&format!("{}/img.png", server.uri()), None)
            .await
            .unwrap();
        assert_eq!(bytes, b"remote");
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let resolver = ImageResolver::new(30).unwrap();
        let err = resolver
            .resolve(&format!("{}/gone.png", server.uri()), None)
            .await
            .unwrap_err();
        match err {
            ImageError::FetchFailed { reason, .. } => assert!(reason.contains("404")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
