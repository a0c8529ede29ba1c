//! SessionRepository trait definition.
//!
//! Persistence for recorded AI-tool sessions. The summarization engine
//! touches exactly two write paths: `save_final_summary` (which also flips
//! the one-way `summarized` flag) and nothing else -- every other mutation
//! belongs to the recorder.

use chronicle_types::error::RepositoryError;
use chronicle_types::session::AiSession;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Repository trait for AI-tool session persistence.
///
/// Implementations live in chronicle-infra (e.g., `SqliteSessionRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait SessionRepository: Send + Sync {
    /// Insert a new session record.
    fn create(
        &self,
        session: &AiSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a session by its unique ID.
    fn get(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<AiSession>, RepositoryError>> + Send;

    /// Attach the cleaned transcript and duration once a recording ends.
    fn finalize_recording(
        &self,
        session_id: &Uuid,
        transcript: &str,
        duration_ms: u64,
        label: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Write the final summary and mark the session summarized.
    ///
    /// The `summarized` flag is one-way; re-running summarization rewrites
    /// the summary text but never clears the flag.
    fn save_final_summary(
        &self,
        session_id: &Uuid,
        summary: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Link a session to a commit recorded shortly after it.
    fn link_commit(
        &self,
        session_id: &Uuid,
        commit_id: i64,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Most recent sessions, newest first.
    fn list_recent(
        &self,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<AiSession>, RepositoryError>> + Send;

    /// Sessions started within `[start, end)`, newest first. `tool` filters
    /// by recorded tool name when present.
    fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        tool: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<AiSession>, RepositoryError>> + Send;

    /// Search sessions whose label or summary contains `term`, newest first.
    fn search(
        &self,
        term: &str,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<AiSession>, RepositoryError>> + Send;
}
