//! # notebook-translator
//!
//! Translate Jupyter notebooks with a language model.
//!
//! Markdown cells keep their original text; each section is followed by a
//! translation block, and every referenced image gets a generated description.
//! Code cells come back with explanatory comments in the target language.
//! Every other cell, and every field the translator does not touch, is copied
//! through unchanged.
//!
//! ## Pipeline Overview
//!
//! ```text
//! notebook.ipynb
//!  │
//!  ├─ 1. Load     parse and validate nbformat JSON
//!  ├─ 2. Route    markdown → sections, code → comments, other → copy
//!  ├─ 3. Model    translate / describe / annotate through edgequake-llm
//!  └─ 4. Rebuild  notebook_translated.ipynb, same cells in the same order
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notebook_translator::{translate_notebook, TranslationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Endpoint read from API_KEY / MODEL_NAME / MODEL_BASE_URL
//!     let config = TranslationConfig::builder()
//!         .target_language("Spanish")
//!         .build()?;
//!     let output = translate_notebook("analysis.ipynb", &config).await?;
//!     println!("{}", output.output_path.display());
//!     eprintln!("{} sections translated, {} images described",
//!         output.stats.sections_translated,
//!         output.stats.images_described);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `translate` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! notebook-translator = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod labels;
pub mod notebook;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod state;
pub mod translate;

#[cfg(test)]
mod testing;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ModelSettings, ResolvedModelSettings, TranslationConfig, TranslationConfigBuilder};
pub use error::{GatewayError, ImageError, TranslateError};
pub use notebook::{load_notebook, output_path_for, Cell, CellKind, CellSource, Notebook};
pub use output::{CellOutcome, CellReport, TranslationOutput, TranslationStats};
pub use pipeline::gateway::Gateway;
pub use progress::{NoopProgressCallback, ProgressCallback, TranslationProgressCallback};
pub use translate::{translate_notebook, translate_notebook_sync};
