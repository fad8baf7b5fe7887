//! Error types for the notebook-translator library.
//!
//! Three error types reflect two distinct failure modes:
//!
//! * [`TranslateError`] is **fatal**: the run cannot proceed at all (notebook
//!   missing or malformed, configuration incomplete, a structural fault in the
//!   cell walk, output not writable). Recorded once in
//!   [`crate::state::ProcessingState`] and returned as `Err(TranslateError)`
//!   from the top-level `translate_*` functions.
//!
//! * [`ImageError`] and [`GatewayError`] are **non-fatal**: a single image could
//!   not be loaded, or a single model call failed. They are logged, counted in
//!   the per-cell [`crate::output::CellReport`], and the affected piece keeps
//!   its original content. They never halt the run.

use edgequake_llm::LlmError;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the notebook-translator library.
#[derive(Debug, Error)]
pub enum TranslateError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Notebook file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    NotebookNotFound { path: PathBuf },

    /// The notebook exists but could not be read.
    #[error("Error loading notebook '{path}': {source}")]
    NotebookRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The notebook is not valid JSON.
    #[error("Error loading notebook '{path}': invalid JSON: {source}")]
    NotebookParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON parsed but does not have the nbformat structure.
    #[error("Invalid notebook '{path}': {reason}")]
    InvalidNotebook { path: PathBuf, reason: String },

    // ── Cell walk errors ──────────────────────────────────────────────────
    /// A processing step was asked for a cell past the end of the document.
    #[error("Cell index {index} out of range (notebook has {total} cells)")]
    CellIndexOutOfRange { index: usize, total: usize },

    /// A processing step found a different cell type than it handles.
    #[error("Expected {expected} cell at index {index}, got {found}")]
    CellTypeMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the translated notebook.
    #[error("Error saving notebook '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// One or more required model settings are absent.
    #[error(
        "Missing configuration: {}\n\
Set them in the environment or in a translate.toml file:\n\n\
  API_KEY=your_api_key\n\
  MODEL_NAME=google/gemini-2.5-flash\n\
  MODEL_BASE_URL=https://openrouter.ai/api/v1\n",
        missing.join(", ")
    )]
    MissingConfig { missing: Vec<String> },

    /// Builder or config-file validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure turning an image reference into bytes.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Neither the reference as given nor its notebook-relative form exists.
    #[error("Image file not found: {reference} (tried {})", display_paths(tried))]
    NotFound {
        reference: String,
        tried: Vec<PathBuf>,
    },

    /// The `data:` URI has no payload or the payload is not base64.
    #[error("Invalid embedded image data: {reason}")]
    InvalidDataUri { reason: String },

    /// Remote image could not be fetched (transport error or non-2xx status).
    #[error("Failed to fetch image '{url}': {reason}")]
    FetchFailed { url: String, reason: String },

    /// Remote image fetch exceeded the configured timeout.
    #[error("Fetching image '{url}' timed out after {secs}s")]
    FetchTimeout { url: String, secs: u64 },

    /// The image file exists but could not be read.
    #[error("Failed to read image '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A non-fatal failure of a single language-model call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider rejected or failed the request.
    #[error("Model request failed: {0}")]
    Provider(#[from] LlmError),

    /// The call exceeded the configured API timeout.
    #[error("Model request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The model answered with no content.
    #[error("Model returned an empty response")]
    EmptyResponse,
}

impl GatewayError {
    /// Whether the failure points at the API key configuration.
    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::Provider(LlmError::AuthError(_)))
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(" and ")
}
