//! Error types for the Strata domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Strata operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Validation errors (rejected before any mutation) ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // --- Summarization-service errors ---
    #[error("Summarizer error: {0}")]
    Summarizer(#[from] SummarizerError),

    // --- Persistence errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Input rejected before any side effect took place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("User id must not be empty")]
    EmptyUserId,

    #[error("Session summary must not be empty")]
    MissingSessionSummary,

    #[error("Layer {layer} is out of range, allowed: {allowed}")]
    LayerOutOfRange { layer: u8, allowed: &'static str },

    #[error("Fact must not be empty")]
    EmptyFact,

    #[error("Field name must not be empty")]
    EmptyFieldName,

    #[error("At least one transcript is required")]
    EmptyTranscripts,
}

/// A call to the external summarization service failed. The affected layer
/// is left unchanged by the caller.
#[derive(Debug, Clone, Error)]
pub enum SummarizerError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by summarizer, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Summarizer returned an empty completion")]
    EmptyCompletion,
}

impl SummarizerError {
    /// Whether a single retry is worth attempting. Authorization and
    /// client-side validation failures will fail again identically.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) | Self::RateLimited { .. } => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::AuthenticationFailed(_) | Self::EmptyCompletion => false,
        }
    }
}

/// The persistent store is unavailable or rejected the operation.
/// Aborts the entire operation, no partial column writes are acceptable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Record serialization failed: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_displays_correctly() {
        let err = Error::Validation(ValidationError::LayerOutOfRange {
            layer: 7,
            allowed: "2-5",
        });
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains("2-5"));
    }

    #[test]
    fn summarizer_error_transience() {
        assert!(SummarizerError::Timeout("30s".into()).is_transient());
        assert!(SummarizerError::Network("connection reset".into()).is_transient());
        assert!(SummarizerError::RateLimited { retry_after_secs: 5 }.is_transient());
        assert!(
            SummarizerError::ApiError {
                status_code: 503,
                message: "overloaded".into()
            }
            .is_transient()
        );
        assert!(
            !SummarizerError::ApiError {
                status_code: 400,
                message: "bad request".into()
            }
            .is_transient()
        );
        assert!(!SummarizerError::AuthenticationFailed("bad key".into()).is_transient());
    }

    #[test]
    fn store_error_displays_correctly() {
        let err = Error::Store(StoreError::Storage("disk full".into()));
        assert!(err.to_string().contains("disk full"));
    }
}
