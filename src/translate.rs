//! Whole-notebook translation entry points.

use crate::config::{ModelSettings, TranslationConfig};
use crate::error::TranslateError;
use crate::output::{TranslationOutput, TranslationStats};
use crate::pipeline::gateway::Gateway;
use crate::pipeline::image::ImageResolver;
use crate::pipeline::router::{self, Route};
use crate::progress::{NoopProgressCallback, TranslationProgressCallback};
use crate::state::ProcessingState;
use edgequake_llm::{LLMProvider, OpenAIProvider};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Translate a notebook and write `{stem}{suffix}.ipynb` next to it.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(TranslationOutput)` once the output notebook is written, even if
/// individual sections, images or code cells fell back to their original
/// content (see [`TranslationOutput::reports`]).
///
/// # Errors
/// Returns `Err(TranslateError)` only for fatal errors:
/// - notebook missing, unreadable or not nbformat
/// - model settings incomplete
/// - output not writable
pub async fn translate_notebook(
    input: impl AsRef<Path>,
    config: &TranslationConfig,
) -> Result<TranslationOutput, TranslateError> {
    let start = Instant::now();
    let input = input.as_ref();
    info!(
        "Translating {} to {}",
        input.display(),
        config.target_language
    );

    let provider = resolve_provider(config)?;
    let gateway = Gateway::new(provider, config.temperature, config.max_tokens)
        .with_timeout(config.api_timeout_secs);
    let resolver = ImageResolver::new(config.fetch_timeout_secs)
        .map_err(|e| TranslateError::Internal(format!("HTTP client: {e}")))?;

    let mut state =
        ProcessingState::load(input, &config.target_language, &config.output_suffix)?;
    let total_cells = state.total_cells();
    info!("Notebook has {} cells", total_cells);

    let noop = NoopProgressCallback;
    let progress: &dyn TranslationProgressCallback = match &config.progress_callback {
        Some(cb) => cb.as_ref(),
        None => &noop,
    };
    progress.on_translation_start(total_cells);

    let output_path = loop {
        match router::route(&mut state, progress) {
            Route::Markdown => {
                router::process_markdown_cell(&mut state, &gateway, &resolver, progress).await
            }
            Route::Code => router::process_code_cell(&mut state, &gateway, progress).await,
            Route::Rebuild => {
                progress.on_translation_complete(total_cells, state.output_cells.len());
                break router::rebuild(&mut state)?;
            }
            Route::Halt => {
                return Err(state
                    .take_error()
                    .unwrap_or_else(|| TranslateError::Internal("halted without error".into())));
            }
        }
    };

    let stats = TranslationStats::from_reports(&state.reports, start.elapsed().as_millis() as u64);
    info!(
        "Translation complete: {} cells ({} markdown, {} code, {} passed through), {}ms",
        stats.total_cells,
        stats.markdown_cells,
        stats.code_cells,
        stats.passthrough_cells,
        stats.total_duration_ms
    );

    Ok(TranslationOutput {
        output_path,
        cells: state.output_cells.len(),
        reports: state.reports,
        stats,
    })
}

/// Synchronous wrapper around [`translate_notebook`].
///
/// Creates a new tokio runtime internally. Do not call from inside an
/// existing async runtime; use [`translate_notebook`] there instead.
pub fn translate_notebook_sync(
    input: impl AsRef<Path>,
    config: &TranslationConfig,
) -> Result<TranslationOutput, TranslateError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TranslateError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(translate_notebook(input, config))
}

/// Pick the LLM provider: an injected one, else the OpenAI-compatible
/// endpoint described by the environment overlaid with explicit settings.
fn resolve_provider(config: &TranslationConfig) -> Result<Arc<dyn LLMProvider>, TranslateError> {
    if let Some(provider) = &config.provider {
        return Ok(Arc::clone(provider));
    }

    let resolved = ModelSettings::from_env()
        .overlay(config.settings.clone())
        .validate()?;
    debug!("Using model {} at {}", resolved.model_name, resolved.base_url);

    let provider = OpenAIProvider::compatible(
        resolved.api_key,
        resolved.base_url.trim_end_matches('/'),
    )
    .with_model(resolved.model_name);
    Ok(Arc::new(provider))
}
