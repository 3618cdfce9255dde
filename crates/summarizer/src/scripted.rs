//! Deterministic scripted summarizer — the primary test double.
//!
//! Replies are served from a FIFO queue of scripted outcomes; when the queue
//! is empty a deterministic default applies: classification prompts (those
//! asking for "YES or NO") answer "NO", everything else echoes the user
//! message. Every call is recorded so tests can assert on prompt content and
//! call counts.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use strata_core::{Summarizer, SummarizerError};

/// One recorded call to the stub.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_message: String,
}

/// A deterministic summarizer for tests and offline development.
pub struct ScriptedSummarizer {
    name: String,
    replies: Mutex<VecDeque<Result<String, SummarizerError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedSummarizer {
    /// A stub whose default behavior echoes the user message (and answers
    /// "NO" to YES/NO classification prompts).
    pub fn echoing() -> Self {
        Self {
            name: "scripted".into(),
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a scripted reply for the next call.
    pub fn push_reply(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(text.into()));
    }

    /// Queue a scripted failure for the next call.
    pub fn push_error(&self, error: SummarizerError) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(error));
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn default_reply(system_prompt: &str, user_message: &str) -> String {
        if system_prompt.contains("YES or NO") {
            "NO".into()
        } else {
            user_message.to_string()
        }
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, SummarizerError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                system_prompt: system_prompt.to_string(),
                user_message: user_message.to_string(),
            });

        let scripted = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match scripted {
            Some(outcome) => outcome,
            None => Ok(Self::default_reply(system_prompt, user_message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_by_default() {
        let stub = ScriptedSummarizer::echoing();
        let out = stub.complete("merge this", "material").await.unwrap();
        assert_eq!(out, "material");
    }

    #[tokio::test]
    async fn answers_no_to_classification_prompts() {
        let stub = ScriptedSummarizer::echoing();
        let out = stub
            .complete("major life event? reply YES or NO only", "went shopping")
            .await
            .unwrap();
        assert_eq!(out, "NO");
    }

    #[tokio::test]
    async fn scripted_replies_served_in_order() {
        let stub = ScriptedSummarizer::echoing();
        stub.push_reply("first");
        stub.push_error(SummarizerError::Timeout("stub".into()));
        stub.push_reply("third");

        assert_eq!(stub.complete("p", "m").await.unwrap(), "first");
        assert!(stub.complete("p", "m").await.is_err());
        assert_eq!(stub.complete("p", "m").await.unwrap(), "third");
        // Queue drained, back to the echo default
        assert_eq!(stub.complete("p", "echo me").await.unwrap(), "echo me");
    }

    #[tokio::test]
    async fn records_every_call() {
        let stub = ScriptedSummarizer::echoing();
        stub.complete("sys-a", "msg-a").await.unwrap();
        stub.complete("sys-b", "msg-b").await.unwrap();

        let calls = stub.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].system_prompt, "sys-a");
        assert_eq!(calls[1].user_message, "msg-b");
    }
}
