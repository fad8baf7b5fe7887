//! Code cells: comment annotation and fence cleanup.
//!
//! Models are asked not to, but often still wrap the commented code in a
//! markdown fence. [`strip_code_fences`] removes one outer fence pair so the
//! cell stays runnable.

use crate::pipeline::gateway::{log_failure, Gateway};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Opening fence with an optional language tag, e.g. ```` ```python ````.
static RE_LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[\w+#.-]*[ \t]*\r?\n?").unwrap());

static RE_TRAILING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n?[ \t]*```$").unwrap());

/// Result of processing one code cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeOutcome {
    pub text: String,
    pub annotated: bool,
    /// Why annotation fell back to the original code.
    pub failure: Option<String>,
}

/// Strip one outer markdown code fence and surrounding whitespace.
pub fn strip_code_fences(input: &str) -> String {
    let trimmed = input.trim();
    let without_open = RE_LEADING_FENCE.replace(trimmed, "");
    let without_close = RE_TRAILING_FENCE.replace(&without_open, "");
    without_close.trim().to_string()
}

/// Ask the model to comment `code` in `target_language`.
///
/// On failure the original code is returned byte for byte.
pub async fn process_code(code: &str, target_language: &str, gateway: &Gateway) -> CodeOutcome {
    match gateway.try_annotate(code, target_language).await {
        Ok(annotated) => {
            let text = strip_code_fences(&annotated);
            debug!("Annotated code cell ({} → {} bytes)", code.len(), text.len());
            CodeOutcome {
                text,
                annotated: true,
                failure: None,
            }
        }
        Err(e) => {
            log_failure("Code commenting", &e);
            CodeOutcome {
                text: code.to_string(),
                annotated: false,
                failure: Some(e.to_string()),
            }
        }
    }
}
