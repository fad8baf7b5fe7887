//! Configuration types for notebook translation.
//!
//! Two layers:
//!
//! * [`ModelSettings`]: the three required settings of the language-model
//!   endpoint (API key, model identifier, base URL). Loaded from a TOML file
//!   and the environment; [`ModelSettings::validate`] reports every missing
//!   key at once.
//! * [`TranslationConfig`]: everything that shapes a run, built via its
//!   [`TranslationConfigBuilder`].

use crate::error::TranslateError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "API_KEY";
/// Environment variable holding the model identifier.
pub const ENV_MODEL_NAME: &str = "MODEL_NAME";
/// Environment variable holding the API base address.
pub const ENV_MODEL_BASE_URL: &str = "MODEL_BASE_URL";

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "translate.toml";

/// Default target language.
pub const DEFAULT_TARGET_LANGUAGE: &str = "Chinese";

/// Suffix inserted before the notebook extension for the output file.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_translated";

/// Language-model endpoint settings.
///
/// Every field is optional while loading; [`ModelSettings::validate`] turns
/// a complete set into [`ResolvedModelSettings`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSettings {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
}

/// A validated, complete set of model settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedModelSettings {
    pub api_key: String,
    pub model_name: String,
    pub base_url: String,
}

impl ModelSettings {
    /// Read the settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup(ENV_API_KEY),
            model_name: lookup(ENV_MODEL_NAME),
            base_url: lookup(ENV_MODEL_BASE_URL),
        }
    }

    /// Parse settings from a TOML document.
    ///
    /// ```toml
    /// api_key = "sk-..."
    /// model_name = "google/gemini-2.5-flash"
    /// base_url = "https://openrouter.ai/api/v1"
    /// ```
    pub fn from_toml_str(raw: &str) -> Result<Self, TranslateError> {
        toml::from_str(raw).map_err(|e| TranslateError::InvalidConfig(e.to_string()))
    }

    /// Load settings from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, TranslateError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TranslateError::InvalidConfig(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Layer `higher` over `self`: every field set in `higher` wins.
    pub fn overlay(self, higher: ModelSettings) -> Self {
        Self {
            api_key: non_empty(higher.api_key).or(non_empty(self.api_key)),
            model_name: non_empty(higher.model_name).or(non_empty(self.model_name)),
            base_url: non_empty(higher.base_url).or(non_empty(self.base_url)),
        }
    }

    /// Check all required settings are present.
    pub fn validate(&self) -> Result<ResolvedModelSettings, TranslateError> {
        let api_key = non_empty(self.api_key.clone());
        let model_name = non_empty(self.model_name.clone());
        let base_url = non_empty(self.base_url.clone());

        match (api_key, model_name, base_url) {
            (Some(api_key), Some(model_name), Some(base_url)) => Ok(ResolvedModelSettings {
                api_key,
                model_name,
                base_url,
            }),
            (api_key, model_name, base_url) => {
                let missing = [
                    (api_key.is_none(), ENV_API_KEY),
                    (model_name.is_none(), ENV_MODEL_NAME),
                    (base_url.is_none(), ENV_MODEL_BASE_URL),
                ]
                .into_iter()
                .filter(|(absent, _)| *absent)
                .map(|(_, key)| key.to_string())
                .collect();
                Err(TranslateError::MissingConfig { missing })
            }
        }
    }
}

impl ResolvedModelSettings {
    /// API key with everything but the last 10 characters hidden.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() > 10 {
            let tail: String = chars[chars.len() - 10..].iter().collect();
            format!("{}{}", "*".repeat(20), tail)
        } else {
            "*".repeat(chars.len())
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl fmt::Debug for ResolvedModelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedModelSettings")
            .field("api_key", &self.masked_api_key())
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Configuration for a notebook translation run.
///
/// # Example
/// ```rust
/// use notebook_translator::TranslationConfig;
///
/// let config = TranslationConfig::builder()
///     .target_language("Spanish")
///     .model_name("google/gemini-2.5-flash")
///     .build()
///     .unwrap();
/// assert_eq!(config.target_language, "Spanish");
/// ```
#[derive(Clone)]
pub struct TranslationConfig {
    /// Language name passed verbatim to the model. Default: "Chinese".
    pub target_language: String,

    /// Endpoint settings set explicitly; merged over the environment when
    /// the provider is created.
    pub settings: ModelSettings,

    /// Pre-constructed LLM provider. Takes precedence over `settings`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for every model call. Default: 0.3.
    pub temperature: f32,

    /// Completion token cap per call. Default: None (endpoint default).
    pub max_tokens: Option<usize>,

    /// Timeout for remote image fetches in seconds. Default: 30.
    pub fetch_timeout_secs: u64,

    /// Timeout for a single model call in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Inserted before the extension of the output file. Default: "_translated".
    pub output_suffix: String,

    /// Optional per-cell progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            settings: ModelSettings::default(),
            provider: None,
            temperature: 0.3,
            max_tokens: None,
            fetch_timeout_secs: 30,
            api_timeout_secs: 120,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("target_language", &self.target_language)
            .field("settings", &self.settings)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("output_suffix", &self.output_suffix)
            .finish()
    }
}

impl TranslationConfig {
    /// Create a new builder for `TranslationConfig`.
    pub fn builder() -> TranslationConfigBuilder {
        TranslationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TranslationConfig`].
pub struct TranslationConfigBuilder {
    config: TranslationConfig,
}

impl TranslationConfigBuilder {
    pub fn target_language(mut self, language: impl Into<String>) -> Self {
        self.config.target_language = language.into();
        self
    }

    pub fn settings(mut self, settings: ModelSettings) -> Self {
        self.config.settings = settings;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.settings.api_key = Some(key.into());
        self
    }

    pub fn model_name(mut self, model: impl Into<String>) -> Self {
        self.config.settings.model_name = Some(model.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.settings.base_url = Some(url.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.output_suffix = suffix.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslationConfig, TranslateError> {
        let c = &self.config;
        if c.target_language.trim().is_empty() {
            return Err(TranslateError::InvalidConfig(
                "target language must not be empty".into(),
            ));
        }
        if c.output_suffix.is_empty() {
            return Err(TranslateError::InvalidConfig(
                "output suffix must not be empty".into(),
            ));
        }
        if c.fetch_timeout_secs == 0 || c.api_timeout_secs == 0 {
            return Err(TranslateError::InvalidConfig(
                "timeouts must be at least 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let c = TranslationConfig::default();
        assert_eq!(c.target_language, "Chinese");
        assert_eq!(c.temperature, 0.3);
        assert_eq!(c.fetch_timeout_secs, 30);
        assert_eq!(c.output_suffix, "_translated");
    }

    #[test]
    fn validate_enumerates_missing_in_order() {
        let s = ModelSettings {
            api_key: None,
            model_name: Some("m".into()),
            base_url: Some("  ".into()),
        };
        match s.validate().unwrap_err() {
            TranslateError::MissingConfig { missing } => {
                assert_eq!(missing, vec!["API_KEY", "MODEL_BASE_URL"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn from_lookup_reads_all_three_keys() {
        let env: HashMap<&str, &str> = [
            ("API_KEY", "k"),
            ("MODEL_NAME", "m"),
            ("MODEL_BASE_URL", "http://x"),
        ]
        .into_iter()
        .collect();
        let s = ModelSettings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        let r = s.validate().unwrap();
        assert_eq!(r.model_name, "m");
        assert_eq!(r.base_url, "http://x");
    }

    #[test]
    fn overlay_prefers_higher_layer_but_ignores_blanks() {
        let file = ModelSettings::from_toml_str(
            "api_key = \"file-key\"\nmodel_name = \"file-model\"\n",
        )
        .unwrap();
        let env = ModelSettings {
            api_key: Some(String::new()),
            model_name: Some("env-model".into()),
            base_url: Some("http://env".into()),
        };
        let merged = file.overlay(env);
        assert_eq!(merged.api_key.as_deref(), Some("file-key"));
        assert_eq!(merged.model_name.as_deref(), Some("env-model"));
        assert_eq!(merged.base_url.as_deref(), Some("http://env"));
    }

    #[test]
    fn unknown_toml_keys_are_rejected() {
        let err = ModelSettings::from_toml_str("apikey = \"x\"").unwrap_err();
        assert!(matches!(err, TranslateError::InvalidConfig(_)));
    }

    #[test]
    fn masked_key() {
        let r = ResolvedModelSettings {
            api_key: "sk-abcdefghijklmnop".into(),
            model_name: "m".into(),
            base_url: "u".into(),
        };
        assert_eq!(r.masked_api_key(), format!("{}ghijklmnop", "*".repeat(20)));

        let short = ResolvedModelSettings {
            api_key: "short".into(),
            ..r
        };
        assert_eq!(short.masked_api_key(), "*****");
    }

    #[test]
    fn builder_rejects_empty_suffix_and_zero_timeouts() {
        assert!(TranslationConfig::builder().output_suffix("").build().is_err());
        assert!(TranslationConfig::builder().fetch_timeout_secs(0).build().is_err());
        assert!(TranslationConfig::builder().target_language(" ").build().is_err());
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = TranslationConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }
}
