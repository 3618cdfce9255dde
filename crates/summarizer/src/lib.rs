//! Summarization-service backends for Strata.
//!
//! Implementations of the [`strata_core::Summarizer`] trait:
//! - [`AnthropicSummarizer`] — Anthropic Messages API
//! - [`OpenAiCompatSummarizer`] — any OpenAI-compatible `/chat/completions`
//!   endpoint (OpenAI, OpenRouter, Ollama, vLLM, ...)
//! - [`RetryingSummarizer`] — timeout + single-transient-retry wrapper the
//!   engine places around either real backend
//! - [`ScriptedSummarizer`] — deterministic stub for tests

pub mod anthropic;
pub mod openai_compat;
pub mod retry;
pub mod scripted;

pub use anthropic::AnthropicSummarizer;
pub use openai_compat::OpenAiCompatSummarizer;
pub use retry::RetryingSummarizer;
pub use scripted::ScriptedSummarizer;

use std::sync::Arc;
use strata_core::Summarizer;

/// Build a summarizer from configuration, wrapped with the configured
/// timeout and retry policy.
pub fn build_from_config(
    config: &strata_config::AppConfig,
) -> Result<Arc<dyn Summarizer>, strata_config::ConfigError> {
    let timeout = std::time::Duration::from_secs(config.summarizer.timeout_secs);
    let retries = config.summarizer.max_retries;

    let inner: Arc<dyn Summarizer> = match config.summarizer.provider.as_str() {
        "anthropic" => {
            let api_key = config.summarizer.api_key.clone().ok_or_else(|| {
                strata_config::ConfigError::Invalid(
                    "summarizer.api_key is required for the anthropic provider".into(),
                )
            })?;
            let mut summarizer =
                AnthropicSummarizer::new(api_key, &config.summarizer.model);
            if let Some(url) = &config.summarizer.api_url {
                summarizer = summarizer.with_base_url(url);
            }
            Arc::new(summarizer)
        }
        "openai-compatible" => {
            let api_key = config.summarizer.api_key.clone().unwrap_or_default();
            let base_url = config
                .summarizer
                .api_url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1".into());
            Arc::new(OpenAiCompatSummarizer::new(
                base_url,
                api_key,
                &config.summarizer.model,
            ))
        }
        "scripted" => Arc::new(ScriptedSummarizer::echoing()),
        other => {
            return Err(strata_config::ConfigError::Invalid(format!(
                "Unknown summarizer provider '{other}'"
            )));
        }
    };

    Ok(Arc::new(RetryingSummarizer::new(inner, timeout, retries)))
}
