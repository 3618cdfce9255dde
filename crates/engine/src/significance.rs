//! Major-life-event classification over a session summary.

use std::sync::Arc;
use strata_core::{Summarizer, SummarizerError};
use tracing::debug;

use crate::prompts;

/// Classifies whether a session summary contains a major life event,
/// gating promotion into the milestones layer.
pub struct SignificanceDetector {
    summarizer: Arc<dyn Summarizer>,
}

impl SignificanceDetector {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }

    /// One classification call. The reply is parsed case-insensitively for
    /// a leading "YES"; anything else counts as no.
    pub async fn is_significant(&self, session_summary: &str) -> Result<bool, SummarizerError> {
        let reply = self
            .summarizer
            .complete(prompts::SIGNIFICANCE_PROMPT, session_summary)
            .await?;
        let significant = reply.trim().to_ascii_uppercase().starts_with("YES");
        debug!(significant, "Significance check completed");
        Ok(significant)
    }
}
