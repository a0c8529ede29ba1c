//! SQLite commit repository implementation.

use chronicle_core::repository::CommitRepository;
use chronicle_types::commit::{Commit, RepoStats};
use chronicle_types::error::RepositoryError;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `CommitRepository`.
pub struct SqliteCommitRepository {
    pool: DatabasePool,
}

impl SqliteCommitRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct CommitRow {
    id: i64,
    timestamp: String,
    sha: String,
    message: String,
    author: String,
    branch: Option<String>,
    repo_path: String,
    files_changed: String,
}

impl CommitRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            timestamp: row.try_get("timestamp")?,
            sha: row.try_get("sha")?,
            message: row.try_get("message")?,
            author: row.try_get("author")?,
            branch: row.try_get("branch")?,
            repo_path: row.try_get("repo_path")?,
            files_changed: row.try_get("files_changed")?,
        })
    }

    fn into_commit(self) -> Result<Commit, RepositoryError> {
        let timestamp = parse_datetime(&self.timestamp)?;
        let files_changed: Vec<String> = serde_json::from_str(&self.files_changed)
            .map_err(|e| RepositoryError::Query(format!("invalid files_changed: {e}")))?;

        Ok(Commit {
            id: self.id,
            timestamp,
            sha: self.sha,
            message: self.message,
            author: self.author,
            branch: self.branch,
            repo_path: self.repo_path,
            files_changed,
        })
    }
}

fn rows_into_commits(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<Commit>, RepositoryError> {
    rows.iter()
        .map(|row| {
            CommitRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_commit()
        })
        .collect()
}

impl CommitRepository for SqliteCommitRepository {
    async fn insert(&self, commit: &Commit) -> Result<i64, RepositoryError> {
        let files = serde_json::to_string(&commit.files_changed)
            .map_err(|e| RepositoryError::Query(format!("files_changed encode: {e}")))?;

        let result = sqlx::query(
            r#"INSERT INTO commits (timestamp, sha, message, author, branch, repo_path, files_changed)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(format_datetime(&commit.timestamp))
        .bind(&commit.sha)
        .bind(&commit.message)
        .bind(&commit.author)
        .bind(&commit.branch)
        .bind(&commit.repo_path)
        .bind(files)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("{} already recorded", commit.sha))
            }
            other => RepositoryError::Query(other.to_string()),
        })?;

        Ok(result.last_insert_rowid())
    }

    async fn exists(&self, sha: &str, repo_path: &str) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM commits WHERE sha = ? AND repo_path = ?")
            .bind(sha)
            .bind(repo_path)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(row.is_some())
    }

    async fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        repo_path: Option<&str>,
    ) -> Result<Vec<Commit>, RepositoryError> {
        let rows = match repo_path {
            Some(repo) => {
                sqlx::query(
                    r#"SELECT * FROM commits
                       WHERE timestamp >= ? AND timestamp < ? AND repo_path = ?
                       ORDER BY timestamp DESC"#,
                )
                .bind(format_datetime(&start))
                .bind(format_datetime(&end))
                .bind(repo)
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query(
                    r#"SELECT * FROM commits
                       WHERE timestamp >= ? AND timestamp < ?
                       ORDER BY timestamp DESC"#,
                )
                .bind(format_datetime(&start))
                .bind(format_datetime(&end))
                .fetch_all(&self.pool.reader)
                .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_into_commits(rows)
    }

    async fn first_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Commit>, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT * FROM commits
               WHERE timestamp >= ? AND timestamp < ?
               ORDER BY timestamp ASC LIMIT 1"#,
        )
        .bind(format_datetime(&start))
        .bind(format_datetime(&end))
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let commit = CommitRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_commit()?;
                Ok(Some(commit))
            }
            None => Ok(None),
        }
    }

    async fn list_recent(
        &self,
        limit: i64,
        repo_path: Option<&str>,
    ) -> Result<Vec<Commit>, RepositoryError> {
        let rows = match repo_path {
            Some(repo) => {
                sqlx::query(
                    "SELECT * FROM commits WHERE repo_path = ? ORDER BY timestamp DESC LIMIT ?",
                )
                .bind(repo)
                .bind(limit)
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM commits ORDER BY timestamp DESC LIMIT ?")
                    .bind(limit)
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_into_commits(rows)
    }

    async fn search(&self, term: &str, limit: i64) -> Result<Vec<Commit>, RepositoryError> {
        let pattern = format!("%{term}%");
        let rows = sqlx::query(
            "SELECT * FROM commits WHERE message LIKE ? ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_into_commits(rows)
    }

    async fn stats(&self, repo_path: &str) -> Result<RepoStats, RepositoryError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM commits WHERE repo_path = ?")
            .bind(repo_path)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let author_rows = sqlx::query("SELECT DISTINCT author FROM commits WHERE repo_path = ?")
            .bind(repo_path)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let authors = author_rows
            .iter()
            .map(|row| row.try_get("author").map_err(|e: sqlx::Error| RepositoryError::Query(e.to_string())))
            .collect::<Result<Vec<String>, _>>()?;

        let latest_row = sqlx::query(
            "SELECT * FROM commits WHERE repo_path = ? ORDER BY timestamp DESC LIMIT 1",
        )
        .bind(repo_path)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let latest_commit = match latest_row {
            Some(row) => Some(
                CommitRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_commit()?,
            ),
            None => None,
        };

        Ok(RepoStats {
            repo_path: repo_path.to_string(),
            total_commits: total.0 as u64,
            authors,
            latest_commit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqliteCommitRepository {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("commits.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        SqliteCommitRepository::new(DatabasePool::new(&url).await.unwrap())
    }

    fn commit(sha: &str, message: &str) -> Commit {
        Commit {
            id: 0,
            timestamp: Utc::now(),
            sha: sha.to_string(),
            message: message.to_string(),
            author: "dev <dev@example.com>".to_string(),
            branch: Some("main".to_string()),
            repo_path: "/work/project".to_string(),
            files_changed: vec!["src/lib.rs".to_string()],
        }
    }

    #[tokio::test]
    async fn test_insert_and_exists() {
        let repo = repo().await;
        let id = repo.insert(&commit("abc123", "Add feature")).await.unwrap();
        assert!(id > 0);
        assert!(repo.exists("abc123", "/work/project").await.unwrap());
        assert!(!repo.exists("abc123", "/other/checkout").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_sha_in_same_repo_conflicts() {
        let repo = repo().await;
        repo.insert(&commit("abc123", "first")).await.unwrap();
        let err = repo.insert(&commit("abc123", "again")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_search_matches_message() {
        let repo = repo().await;
        repo.insert(&commit("aaa111", "Fix quota rollover")).await.unwrap();
        repo.insert(&commit("bbb222", "Refactor planner")).await.unwrap();

        let hits = repo.search("quota", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sha, "aaa111");
    }

    #[tokio::test]
    async fn test_stats_counts_and_latest() {
        let repo = repo().await;
        repo.insert(&commit("aaa111", "first")).await.unwrap();
        repo.insert(&commit("bbb222", "second")).await.unwrap();

        let stats = repo.stats("/work/project").await.unwrap();
        assert_eq!(stats.total_commits, 2);
        assert_eq!(stats.authors.len(), 1);
        assert!(stats.latest_commit.is_some());
    }
}
