//! Error types shared across Chronicle crates.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors from repository operations (used by trait definitions in chronicle-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the text-generation provider boundary.
///
/// `RateLimited` is distinguishable from other transient failures so the
/// retry controller can apply the provider-suggested delay (when present)
/// and a larger backoff base.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("transient provider error: {0}")]
    Transient(String),

    #[error("provider call timed out after {0}s")]
    Timeout(u64),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Whether a retry can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Transient(_)
                | ProviderError::Timeout(_)
        )
    }
}

/// Errors from the summarization engine.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("session {0} has no transcript")]
    MissingTranscript(Uuid),

    #[error("every catalog model is at its daily limit for {date}")]
    QuotaExhausted { date: NaiveDate },

    #[error("chunk {chunk_number} failed after exhausting retries: {source}")]
    ChunkRetryExhausted {
        chunk_number: u32,
        /// Chunks committed before the failure; all remain persisted.
        completed_chunks: u32,
        /// Last cumulative summary, annotated with a truncation marker.
        partial_summary: String,
        source: ProviderError,
    },

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Errors from git repository scanning.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("path does not exist: {0}")]
    PathMissing(String),

    #[error("not a valid git repository: {0}")]
    NotARepository(String),

    #[error("git error: {0}")]
    Git(String),
}

/// Errors from configuration loading and persistence.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(String),

    #[error("could not parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_retryability() {
        assert!(ProviderError::RateLimited { retry_after_ms: Some(12_000) }.is_retryable());
        assert!(ProviderError::Transient("connection reset".to_string()).is_retryable());
        assert!(ProviderError::Timeout(120).is_retryable());
        assert!(!ProviderError::AuthenticationFailed.is_retryable());
        assert!(!ProviderError::InvalidRequest("empty prompt".to_string()).is_retryable());
    }

    #[test]
    fn test_summarize_error_display() {
        let err = SummarizeError::QuotaExhausted {
            date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
        };
        assert!(err.to_string().contains("2026-08-07"));

        let err = SummarizeError::ChunkRetryExhausted {
            chunk_number: 4,
            completed_chunks: 3,
            partial_summary: "partial".to_string(),
            source: ProviderError::Transient("503".to_string()),
        };
        assert!(err.to_string().contains("chunk 4"));
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }
}
