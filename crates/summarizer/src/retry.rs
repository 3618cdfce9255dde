//! Timeout and retry wrapper.
//!
//! Every summarization call is individually timeout-bounded so one slow
//! call can't stall or corrupt unrelated steps in the same pass. Transient
//! failures (timeout, network, rate limit, 5xx) get a bounded number of
//! retries; authorization and validation failures fail immediately.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use strata_core::{Summarizer, SummarizerError};
use tracing::warn;

/// Wraps a summarizer with a per-call timeout and transient-failure retries.
pub struct RetryingSummarizer {
    inner: Arc<dyn Summarizer>,
    timeout: Duration,
    max_retries: u32,
}

impl RetryingSummarizer {
    /// Wrap `inner` with the given per-call timeout and retry count.
    pub fn new(inner: Arc<dyn Summarizer>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            inner,
            timeout,
            max_retries,
        }
    }
}

#[async_trait]
impl Summarizer for RetryingSummarizer {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, SummarizerError> {
        let mut last_error = SummarizerError::Network("no attempt made".into());

        for attempt in 0..=self.max_retries {
            match tokio::time::timeout(
                self.timeout,
                self.inner.complete(system_prompt, user_message),
            )
            .await
            {
                Ok(Ok(text)) => return Ok(text),
                Ok(Err(e)) if e.is_transient() => {
                    warn!(
                        summarizer = %self.inner.name(),
                        attempt = attempt + 1,
                        error = %e,
                        "Transient summarizer failure"
                    );
                    last_error = e;
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!(
                        summarizer = %self.inner.name(),
                        attempt = attempt + 1,
                        timeout_secs = self.timeout.as_secs(),
                        "Summarizer call timed out"
                    );
                    last_error = SummarizerError::Timeout(format!(
                        "summarizer '{}' exceeded {}s",
                        self.inner.name(),
                        self.timeout.as_secs()
                    ));
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedSummarizer;

    #[tokio::test]
    async fn passes_through_success() {
        let stub = Arc::new(ScriptedSummarizer::echoing());
        let retrying = RetryingSummarizer::new(stub, Duration::from_secs(5), 1);
        let out = retrying.complete("merge", "hello").await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let stub = ScriptedSummarizer::echoing();
        stub.push_error(SummarizerError::Network("connection reset".into()));
        stub.push_reply("recovered");
        let retrying = RetryingSummarizer::new(Arc::new(stub), Duration::from_secs(5), 1);

        let out = retrying.complete("merge", "material").await.unwrap();
        assert_eq!(out, "recovered");
    }

    #[tokio::test]
    async fn does_not_retry_auth_failure() {
        let stub = ScriptedSummarizer::echoing();
        stub.push_error(SummarizerError::AuthenticationFailed("bad key".into()));
        stub.push_reply("should never be reached");
        let retrying = RetryingSummarizer::new(Arc::new(stub), Duration::from_secs(5), 3);

        let err = retrying.complete("merge", "material").await.unwrap_err();
        assert!(matches!(err, SummarizerError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn exhausted_retries_return_last_error() {
        let stub = ScriptedSummarizer::echoing();
        stub.push_error(SummarizerError::Network("reset 1".into()));
        stub.push_error(SummarizerError::Network("reset 2".into()));
        let retrying = RetryingSummarizer::new(Arc::new(stub), Duration::from_secs(5), 1);

        let err = retrying.complete("merge", "material").await.unwrap_err();
        assert!(err.to_string().contains("reset 2"));
    }
}
