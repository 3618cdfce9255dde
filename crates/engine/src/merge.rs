//! LLM-assisted merge of new material into a layer's text.
//!
//! The word budget is enforced by instruction; the service complies on a
//! best-effort basis. A hard clip at `hard_clip_factor` × budget catches
//! runaway completions. On any summarizer failure the caller keeps the prior
//! layer text unchanged — a merge never returns partial output.

use std::sync::Arc;
use strata_core::{ExtractionCategory, Summarizer, SummarizerError};
use tracing::{debug, warn};

use crate::prompts;

const DEFAULT_HARD_CLIP_FACTOR: f32 = 1.5;

/// Folds new material into existing layer text within a word budget.
pub struct MergeEngine {
    summarizer: Arc<dyn Summarizer>,
    hard_clip_factor: f32,
}

impl MergeEngine {
    /// Create a merge engine over the given summarizer. Timeout and retry
    /// policy belong to the summarizer wrapper, not here.
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            summarizer,
            hard_clip_factor: DEFAULT_HARD_CLIP_FACTOR,
        }
    }

    /// Override the post-merge hard clip (as a multiple of the budget).
    pub fn with_hard_clip_factor(mut self, factor: f32) -> Self {
        self.hard_clip_factor = factor.max(1.0);
        self
    }

    /// Merge `material` into `existing`, returning the full replacement
    /// text for the layer.
    pub async fn merge(
        &self,
        existing: &str,
        material: &str,
        budget_words: usize,
        categories: &[ExtractionCategory],
    ) -> Result<String, SummarizerError> {
        let system = prompts::merge_system(budget_words, categories);
        let message = prompts::merge_material(existing, material);

        let merged = self.summarizer.complete(&system, &message).await?;
        debug!(
            budget_words,
            merged_words = word_count(&merged),
            "Merge completed"
        );

        Ok(self.clip(merged, budget_words))
    }

    /// Clip to `hard_clip_factor` × budget at a word boundary. Defense
    /// against a summarizer that ignores the budget instruction entirely.
    fn clip(&self, text: String, budget_words: usize) -> String {
        let limit = (budget_words as f32 * self.hard_clip_factor).ceil() as usize;
        if word_count(&text) <= limit {
            return text;
        }
        warn!(
            budget_words,
            limit,
            actual = word_count(&text),
            "Merge output exceeded hard clip, truncating"
        );
        text.split_whitespace()
            .take(limit)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Whitespace-delimited word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
