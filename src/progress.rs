//! Progress-callback trait for per-cell translation events.
//!
//! Inject an [`Arc<dyn TranslationProgressCallback>`] via
//! [`crate::config::TranslationConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks the notebook.
//!
//! # Example
//!
//! ```rust
//! use notebook_translator::{CellReport, TranslationConfig, TranslationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl TranslationProgressCallback for CountingCallback {
//!     fn on_cell_complete(&self, index: usize, total_cells: usize, report: &CellReport) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("cell {}/{} {} ({done} done)", index + 1, total_cells, report.kind);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = TranslationConfig::builder()
//!     .progress_callback(counter as Arc<dyn TranslationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::notebook::CellKind;
use crate::output::CellReport;
use std::sync::Arc;

/// Called by the pipeline as it consumes each cell.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Indices are 0-based.
pub trait TranslationProgressCallback: Send + Sync {
    /// Called once after the notebook is loaded.
    fn on_translation_start(&self, total_cells: usize) {
        let _ = total_cells;
    }

    /// Called before a markdown or code cell is sent to the model.
    fn on_cell_start(&self, index: usize, total_cells: usize, kind: &CellKind) {
        let _ = (index, total_cells, kind);
    }

    /// Called once per cell, including passed-through cells.
    fn on_cell_complete(&self, index: usize, total_cells: usize, report: &CellReport) {
        let _ = (index, total_cells, report);
    }

    /// Called once after the last cell, before the notebook is written.
    fn on_translation_complete(&self, total_cells: usize, processed_cells: usize) {
        let _ = (total_cells, processed_cells);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl TranslationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TranslationConfig`].
pub type ProgressCallback = Arc<dyn TranslationProgressCallback>;
