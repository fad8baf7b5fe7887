//! Cell routing: decide what happens to the next cell.
//!
//! ```text
//! load ──▶ route ──┬─▶ process_markdown_cell ──┐
//!            ▲     ├─▶ process_code_cell ──────┤
//!            │     ├─▶ rebuild                 │
//!            │     └─▶ halt                    │
//!            └─────────────────────────────────┘
//! ```
//!
//! [`route`] consumes any run of unsupported cells itself, so it only ever
//! hands back a cell a step function can process, the end of the document, or
//! a recorded error. Each step consumes exactly one cell.

use crate::error::TranslateError;
use crate::notebook::{write_notebook, Cell, CellKind};
use crate::output::{CellOutcome, CellReport};
use crate::pipeline::code::process_code;
use crate::pipeline::gateway::Gateway;
use crate::pipeline::image::ImageResolver;
use crate::pipeline::markdown::process_markdown;
use crate::progress::TranslationProgressCallback;
use crate::state::ProcessingState;
use std::path::PathBuf;
use tracing::{debug, info};

/// Where the driver goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Markdown,
    Code,
    Rebuild,
    Halt,
}

/// Pick the next step, passing unsupported cells straight through.
///
/// Writes: `output_cells`, `reports`, `index` (pass-through cells only).
pub fn route(state: &mut ProcessingState, progress: &dyn TranslationProgressCallback) -> Route {
    loop {
        if state.error.is_some() {
            return Route::Halt;
        }
        let Some(cell) = state.current_cell() else {
            return Route::Rebuild;
        };
        match &cell.cell_type {
            CellKind::Markdown => return Route::Markdown,
            CellKind::Code => return Route::Code,
            CellKind::Other(tag) => {
                debug!("Passing through {} cell {}", tag, state.index);
                let cell = cell.clone();
                let report = CellReport::new(
                    state.index,
                    cell.cell_type.clone(),
                    CellOutcome::PassedThrough,
                );
                complete(state, cell, report, progress);
            }
        }
    }
}

/// Translate the markdown cell at the current index.
///
/// Writes: `output_cells`, `reports`, `index`; `error` on a structural fault.
pub async fn process_markdown_cell(
    state: &mut ProcessingState,
    gateway: &Gateway,
    resolver: &ImageResolver,
    progress: &dyn TranslationProgressCallback,
) {
    let Some(cell) = expect_cell(state, &CellKind::Markdown) else {
        return;
    };
    progress.on_cell_start(state.index, state.total_cells(), &cell.cell_type);

    let source = cell.source.to_text();
    let outcome = process_markdown(
        &source,
        &state.target_language,
        Some(state.source_path.as_path()),
        gateway,
        resolver,
    )
    .await;

    let new_cell = if source.is_empty() {
        cell.clone()
    } else {
        cell.with_source_text(&outcome.text)
    };
    let report = CellReport::new(
        state.index,
        CellKind::Markdown,
        CellOutcome::Translated {
            sections_translated: outcome.sections_translated,
            sections_failed: outcome.sections_failed,
            images_described: outcome.images_described,
            images_failed: outcome.images_failed,
        },
    );
    complete(state, new_cell, report, progress);
}

/// Annotate the code cell at the current index.
///
/// Writes: `output_cells`, `reports`, `index`; `error` on a structural fault.
pub async fn process_code_cell(
    state: &mut ProcessingState,
    gateway: &Gateway,
    progress: &dyn TranslationProgressCallback,
) {
    let Some(cell) = expect_cell(state, &CellKind::Code) else {
        return;
    };
    progress.on_cell_start(state.index, state.total_cells(), &cell.cell_type);

    let source = cell.source.to_text();
    let outcome = process_code(&source, &state.target_language, gateway).await;

    let (new_cell, result) = match outcome.failure {
        None => (
            cell.with_source_text(&outcome.text),
            CellOutcome::Annotated,
        ),
        Some(reason) => (cell.clone(), CellOutcome::AnnotationFailed { reason }),
    };
    let report = CellReport::new(state.index, CellKind::Code, result);
    complete(state, new_cell, report, progress);
}

/// Write the output notebook from the processed cells.
///
/// Refuses when an error has been recorded, returning that error, or when
/// cells remain unprocessed.
/// Writes: `error` (taken).
pub fn rebuild(state: &mut ProcessingState) -> Result<PathBuf, TranslateError> {
    if let Some(e) = state.take_error() {
        return Err(e);
    }
    if !state.is_done() {
        return Err(TranslateError::Internal(format!(
            "rebuild requested with {} of {} cells processed",
            state.output_cells.len(),
            state.total_cells()
        )));
    }

    let notebook = state.document.with_cells(state.output_cells.clone());
    write_notebook(&notebook, &state.output_path)?;
    Ok(state.output_path.clone())
}

/// Clone the current cell if it exists and has the expected kind; otherwise
/// record the fault.
fn expect_cell(state: &mut ProcessingState, expected: &CellKind) -> Option<Cell> {
    let total = state.total_cells();
    let index = state.index;
    let Some(cell) = state.current_cell() else {
        state.fail(TranslateError::CellIndexOutOfRange { index, total });
        return None;
    };
    if &cell.cell_type != expected {
        let found = cell.cell_type.to_string();
        state.fail(TranslateError::CellTypeMismatch {
            index,
            expected: expected.to_string(),
            found,
        });
        return None;
    }
    Some(cell.clone())
}

fn complete(
    state: &mut ProcessingState,
    cell: Cell,
    report: CellReport,
    progress: &dyn TranslationProgressCallback,
) {
    let index = state.index;
    let total = state.total_cells();
    info!(
        "Processed {} cell {}/{}: {}",
        report.kind,
        index + 1,
        total,
        report.outcome.summary()
    );
    progress.on_cell_complete(index, total, &report);
    state.push(cell, report);
}
