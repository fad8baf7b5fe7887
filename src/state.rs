//! The mutable context threaded through one translation run.
//!
//! A [`ProcessingState`] is owned by the driver and lent by `&mut` to one step
//! at a time. Every mutating method lists the fields it writes. Between steps
//! `index == output_cells.len() == reports.len()` holds.

use crate::error::TranslateError;
use crate::notebook::{load_notebook, output_path_for, Cell, Notebook};
use crate::output::CellReport;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug)]
pub struct ProcessingState {
    /// The loaded notebook. Read-only until the rebuild.
    pub document: Notebook,
    /// Processed cells, appended in input order.
    pub output_cells: Vec<Cell>,
    /// Next cell to consume.
    pub index: usize,
    pub target_language: String,
    /// First fatal error; once set, processing stops.
    pub error: Option<TranslateError>,
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub reports: Vec<CellReport>,
}

impl ProcessingState {
    /// Load `path` and start a run with an empty output.
    ///
    /// Writes: every field.
    pub fn load(
        path: &Path,
        target_language: &str,
        output_suffix: &str,
    ) -> Result<Self, TranslateError> {
        let document = load_notebook(path)?;
        Ok(Self::new(document, path, target_language, output_suffix))
    }

    /// Start a run over an already loaded notebook.
    ///
    /// Writes: every field.
    pub fn new(
        document: Notebook,
        source_path: &Path,
        target_language: &str,
        output_suffix: &str,
    ) -> Self {
        let capacity = document.cells.len();
        Self {
            document,
            output_cells: Vec::with_capacity(capacity),
            index: 0,
            target_language: target_language.to_string(),
            error: None,
            source_path: source_path.to_path_buf(),
            output_path: output_path_for(source_path, output_suffix),
            reports: Vec::with_capacity(capacity),
        }
    }

    pub fn total_cells(&self) -> usize {
        self.document.cells.len()
    }

    /// The cell at `index`, if any remain.
    pub fn current_cell(&self) -> Option<&Cell> {
        self.document.cells.get(self.index)
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.total_cells()
    }

    /// Record a fatal error. Later errors are logged and dropped.
    ///
    /// Writes: `error`.
    pub fn fail(&mut self, error: TranslateError) {
        if let Some(first) = &self.error {
            warn!("Ignoring error after '{}': {}", first, error);
            return;
        }
        self.error = Some(error);
    }

    /// Append a processed cell and its report, then advance.
    ///
    /// Writes: `output_cells`, `reports`, `index`.
    pub fn push(&mut self, cell: Cell, report: CellReport) {
        self.output_cells.push(cell);
        self.reports.push(report);
        self.index += 1;
    }

    /// Take the recorded error, if any.
    ///
    /// Writes: `error`.
    pub fn take_error(&mut self) -> Option<TranslateError> {
        self.error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::CellKind;
    use crate::output::CellOutcome;
    use serde_json::Map;

    fn notebook(cells: Vec<Cell>) -> Notebook {
        Notebook {
            cells,
            metadata: Map::new(),
            nbformat: 4,
            nbformat_minor: 5,
            extra: Map::new(),
        }
    }

    #[test]
    fn new_state_is_empty_and_derives_output_path() {
        let state = ProcessingState::new(
            notebook(vec![Cell::new(CellKind::Code, "x")]),
            Path::new("/tmp/a.ipynb"),
            "French",
            "_translated",
        );
        assert_eq!(state.index, 0);
        assert_eq!(state.total_cells(), 1);
        assert!(state.output_cells.is_empty());
        assert_eq!(state.output_path, PathBuf::from("/tmp/a_translated.ipynb"));
        assert!(!state.is_done());
    }

    #[test]
    fn push_keeps_index_in_step_with_output() {
        let cell = Cell::new(CellKind::Other("raw".into()), "r");
        let mut state = ProcessingState::new(
            notebook(vec![cell.clone()]),
            Path::new("a.ipynb"),
            "French",
            "_t",
        );
        state.push(
            cell.clone(),
            CellReport::new(0, cell.cell_type.clone(), CellOutcome::PassedThrough),
        );
        assert_eq!(state.index, state.output_cells.len());
        assert_eq!(state.index, state.reports.len());
        assert!(state.is_done());
        assert!(state.current_cell().is_none());
    }

    #[test]
    fn first_error_wins() {
        let mut state =
            ProcessingState::new(notebook(vec![]), Path::new("a.ipynb"), "French", "_t");
        state.fail(TranslateError::Internal("first".into()));
        state.fail(TranslateError::Internal("second".into()));
        match state.take_error() {
            Some(TranslateError::Internal(msg)) => assert_eq!(msg, "first"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn load_propagates_missing_file() {
        let err = ProcessingState::load(Path::new("/nope/nb.ipynb"), "French", "_t").unwrap_err();
        assert!(matches!(err, TranslateError::NotebookNotFound { .. }));
    }
}
