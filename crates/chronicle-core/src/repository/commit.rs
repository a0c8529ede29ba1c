//! CommitRepository trait definition.
//!
//! Persistence for commits captured by the git scanner. A commit is
//! logically identified by (sha, repo_path); the scanner checks existence
//! before inserting so re-scans are idempotent.

use chronicle_types::commit::{Commit, RepoStats};
use chronicle_types::error::RepositoryError;
use chrono::{DateTime, Utc};

/// Repository trait for git commit records.
///
/// Implementations live in chronicle-infra (e.g., `SqliteCommitRepository`).
pub trait CommitRepository: Send + Sync {
    /// Insert a commit and return its database id.
    fn insert(
        &self,
        commit: &Commit,
    ) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;

    /// Whether a (sha, repo_path) pair is already recorded.
    fn exists(
        &self,
        sha: &str,
        repo_path: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Commits within `[start, end)`, newest first, optionally filtered by repo.
    fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        repo_path: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<Commit>, RepositoryError>> + Send;

    /// Earliest commit within `[start, end)`, for session-to-commit linking.
    fn first_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Option<Commit>, RepositoryError>> + Send;

    /// Most recent commits, newest first, optionally filtered by repo.
    fn list_recent(
        &self,
        limit: i64,
        repo_path: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<Commit>, RepositoryError>> + Send;

    /// Commits whose message contains `term`, newest first.
    fn search(
        &self,
        term: &str,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Commit>, RepositoryError>> + Send;

    /// Aggregate statistics for one repository.
    fn stats(
        &self,
        repo_path: &str,
    ) -> impl std::future::Future<Output = Result<RepoStats, RepositoryError>> + Send;
}
