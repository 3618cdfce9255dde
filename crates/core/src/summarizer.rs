//! Summarizer trait — the boundary to the external summarization service.
//!
//! The service receives a system prompt (merge or classification
//! instructions) plus a user message (the material) and returns plain text.
//! It honors instructions on a best-effort basis only: no hard guarantee on
//! word counts or exact markers, which is why budgets stay soft and callers
//! clip defensively.
//!
//! Implementations: Anthropic Messages API, OpenAI-compatible endpoints,
//! and a deterministic scripted stub for tests.

use crate::error::SummarizerError;
use async_trait::async_trait;

/// The core Summarizer trait.
///
/// Every summarization backend implements this trait. The merge engine calls
/// `complete()` without knowing which backend is in use.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// A human-readable name for this backend (e.g., "anthropic", "scripted").
    fn name(&self) -> &str;

    /// Send instructions plus material and get the completion text back.
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> std::result::Result<String, SummarizerError>;
}
