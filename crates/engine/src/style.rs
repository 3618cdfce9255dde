//! Interaction-style characterization from recent transcripts.
//!
//! Produces a short style description (formality, response length, humor
//! tolerance, decision-making style, emotional openness, energizing vs
//! avoided topics). Scheduling belongs to the external orchestrator — the
//! session-end path never triggers this.

use std::sync::Arc;
use strata_core::{Summarizer, SummarizerError};
use tracing::debug;

use crate::prompts;

const DEFAULT_TRANSCRIPT_CAP: usize = 20;
/// The instruction asks for at most 100 words; clip hard at the same bound
/// the merge engine uses for runaway completions.
const STYLE_WORD_LIMIT: usize = 150;

/// Produces a user's communication-style description.
pub struct CommunicationStyleAnalyzer {
    summarizer: Arc<dyn Summarizer>,
    transcript_cap: usize,
}

impl CommunicationStyleAnalyzer {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            summarizer,
            transcript_cap: DEFAULT_TRANSCRIPT_CAP,
        }
    }

    /// Cap how many of the most recent transcripts are considered.
    pub fn with_transcript_cap(mut self, cap: usize) -> Self {
        self.transcript_cap = cap.max(1);
        self
    }

    /// One summarization call over the most recent transcripts.
    pub async fn analyze(&self, transcripts: &[String]) -> Result<String, SummarizerError> {
        let start = transcripts.len().saturating_sub(self.transcript_cap);
        let material = prompts::style_material(&transcripts[start..]);

        let description = self
            .summarizer
            .complete(prompts::STYLE_PROMPT, &material)
            .await?;
        let description = description.trim();
        if description.is_empty() {
            return Err(SummarizerError::EmptyCompletion);
        }

        let words: Vec<&str> = description.split_whitespace().collect();
        let clipped = if words.len() > STYLE_WORD_LIMIT {
            words[..STYLE_WORD_LIMIT].join(" ")
        } else {
            description.to_string()
        };

        debug!(
            transcripts = transcripts.len(),
            words = words.len().min(STYLE_WORD_LIMIT),
            "Style analysis completed"
        );
        Ok(clipped)
    }
}
