//! Language-model gateway: the three capability calls the pipeline needs.
//!
//! [`Gateway`] exposes `translate`, `describe` and `annotate` on top of an
//! [`LLMProvider`]. Each call comes in two flavours:
//!
//! * `try_*` returns `Result<String, GatewayError>` so a processor can decide
//!   to skip the piece that failed;
//! * the plain form is best-effort: it logs the failure and returns the input
//!   unchanged (`translate`, `annotate`) or a placeholder (`describe`).
//!
//! No call is retried. Prompt wording lives in [`crate::prompts`].

use crate::error::GatewayError;
use crate::pipeline::encode::encode_image;
use crate::prompts;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// Default per-call timeout in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 120;

/// The translate / describe / annotate capabilities over an LLM provider.
#[derive(Clone)]
pub struct Gateway {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout_secs: u64,
}

impl Gateway {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        temperature: f32,
        max_tokens: Option<usize>,
    ) -> Self {
        Self {
            provider,
            options: CompletionOptions {
                temperature: Some(temperature),
                max_tokens,
                ..Default::default()
            },
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }

    /// Bound every call to `secs` seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Translate markdown text into `target_language`.
    pub async fn try_translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, GatewayError> {
        let messages = [
            ChatMessage::system(prompts::TRANSLATE_SYSTEM_PROMPT),
            ChatMessage::user(prompts::translate_prompt(text, target_language)),
        ];
        self.call("translate", &messages).await
    }

    /// Describe an image in `target_language`.
    pub async fn try_describe(
        &self,
        image: &[u8],
        target_language: &str,
    ) -> Result<String, GatewayError> {
        let messages = [ChatMessage::user_with_images(
            prompts::describe_prompt(target_language),
            vec![encode_image(image)],
        )];
        self.call("describe", &messages).await
    }

    /// Add comments in `target_language` to `code`.
    pub async fn try_annotate(
        &self,
        code: &str,
        target_language: &str,
    ) -> Result<String, GatewayError> {
        let messages = [
            ChatMessage::system(prompts::annotate_system_prompt(target_language)),
            ChatMessage::user(prompts::annotate_prompt(code, target_language)),
        ];
        self.call("annotate", &messages).await
    }

    /// Best-effort translation: the original text on failure.
    pub async fn translate(&self, text: &str, target_language: &str) -> String {
        match self.try_translate(text, target_language).await {
            Ok(translated) => translated,
            Err(e) => {
                log_failure("Translation", &e);
                text.to_string()
            }
        }
    }

    /// Best-effort description: a bracketed placeholder on failure.
    pub async fn describe(&self, image: &[u8], target_language: &str) -> String {
        match self.try_describe(image, target_language).await {
            Ok(description) => description,
            Err(e) => {
                log_failure("Image description", &e);
                format!("[Unable to generate image description: {e}]")
            }
        }
    }

    /// Best-effort annotation: the original code on failure.
    pub async fn annotate(&self, code: &str, target_language: &str) -> String {
        match self.try_annotate(code, target_language).await {
            Ok(annotated) => annotated,
            Err(e) => {
                log_failure("Code commenting", &e);
                code.to_string()
            }
        }
    }

    async fn call(&self, kind: &str, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        let start = Instant::now();
        let chat = self.provider.chat(messages, Some(&self.options));
        let result = match timeout(Duration::from_secs(self.timeout_secs), chat).await {
            Err(_) => Err(GatewayError::Timeout {
                secs: self.timeout_secs,
            }),
            Ok(Err(e)) => Err(GatewayError::from(e)),
            Ok(Ok(response)) => {
                debug!(
                    "{} via {}: {} input tokens, {} output tokens, {:?}",
                    kind,
                    self.provider.model(),
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                let content = response.content.trim();
                if content.is_empty() {
                    Err(GatewayError::EmptyResponse)
                } else {
                    Ok(content.to_string())
                }
            }
        };

        if let Err(e) = &result {
            if e.is_auth() {
                warn!("Hint: check the API_KEY configuration");
            }
        }
        result
    }
}

pub(crate) fn log_failure(what: &str, e: &GatewayError) {
    warn!("{} error: {}", what, e);
}
