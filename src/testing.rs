//! Closure-backed provider for unit tests.

use async_trait::async_trait;
use edgequake_llm::{ChatMessage, ChatRole, CompletionOptions, LLMProvider, LLMResponse, LlmError};
use std::sync::{Arc, Mutex};

type Reply = dyn Fn(&[ChatMessage]) -> Result<String, LlmError> + Send + Sync;

/// Answers every chat from a closure and records what it was sent.
pub(crate) struct FnProvider {
    reply: Box<Reply>,
    pub seen: Mutex<Vec<(Vec<ChatMessage>, Option<CompletionOptions>)>>,
}

impl FnProvider {
    pub fn new(
        reply: impl Fn(&[ChatMessage]) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LLMProvider for FnProvider {
    fn name(&self) -> &str {
        "fn"
    }

    fn model(&self) -> &str {
        "fn-model"
    }

    fn max_context_length(&self) -> usize {
        8192
    }

    async fn complete(&self, prompt: &str) -> edgequake_llm::Result<LLMResponse> {
        self.chat(&[ChatMessage::user(prompt)], None).await
    }

    async fn complete_with_options(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> edgequake_llm::Result<LLMResponse> {
        self.chat(&[ChatMessage::user(prompt)], Some(options)).await
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: Option<&CompletionOptions>,
    ) -> edgequake_llm::Result<LLMResponse> {
        self.seen
            .lock()
            .unwrap()
            .push((messages.to_vec(), options.cloned()));
        let content = (self.reply)(messages)?;
        Ok(LLMResponse::new(content, "fn-model"))
    }
}

/// Text of the last user message.
pub(crate) fn user_text(messages: &[ChatMessage]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == ChatRole::User)
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}

pub(crate) fn system_text(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .find(|m| m.role == ChatRole::System)
        .map(|m| m.content.as_str())
}

pub(crate) fn has_image(messages: &[ChatMessage]) -> bool {
    messages.iter().any(|m| m.has_images())
}
