//! SQLite session repository implementation.
//!
//! Implements `SessionRepository` from `chronicle-core` using sqlx with
//! split read/write pools: raw queries, a private Row struct, reads on the
//! reader pool, writes on the writer pool.

use chronicle_core::repository::SessionRepository;
use chronicle_types::error::RepositoryError;
use chronicle_types::session::AiSession;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `SessionRepository`.
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct SessionRow {
    id: String,
    started_at: String,
    tool: String,
    label: String,
    summary: Option<String>,
    transcript: Option<String>,
    duration_ms: Option<i64>,
    summarized: i64,
    working_directory: Option<String>,
    repo_path: Option<String>,
    related_commit_id: Option<i64>,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            started_at: row.try_get("started_at")?,
            tool: row.try_get("tool")?,
            label: row.try_get("label")?,
            summary: row.try_get("summary")?,
            transcript: row.try_get("transcript")?,
            duration_ms: row.try_get("duration_ms")?,
            summarized: row.try_get("summarized")?,
            working_directory: row.try_get("working_directory")?,
            repo_path: row.try_get("repo_path")?,
            related_commit_id: row.try_get("related_commit_id")?,
        })
    }

    fn into_session(self) -> Result<AiSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let started_at = parse_datetime(&self.started_at)?;

        Ok(AiSession {
            id,
            started_at,
            tool: self.tool,
            label: self.label,
            summary: self.summary,
            transcript: self.transcript,
            duration_ms: self.duration_ms.map(|v| v as u64),
            summarized: self.summarized != 0,
            working_directory: self.working_directory,
            repo_path: self.repo_path,
            related_commit_id: self.related_commit_id,
        })
    }
}

fn rows_into_sessions(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<AiSession>, RepositoryError> {
    rows.iter()
        .map(|row| {
            SessionRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_session()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SessionRepository implementation
// ---------------------------------------------------------------------------

impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: &AiSession) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO ai_sessions
               (id, started_at, tool, label, summary, transcript, duration_ms, summarized, working_directory, repo_path, related_commit_id)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(format_datetime(&session.started_at))
        .bind(&session.tool)
        .bind(&session.label)
        .bind(&session.summary)
        .bind(&session.transcript)
        .bind(session.duration_ms.map(|v| v as i64))
        .bind(session.summarized as i64)
        .bind(&session.working_directory)
        .bind(&session.repo_path)
        .bind(session.related_commit_id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, session_id: &Uuid) -> Result<Option<AiSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM ai_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row =
                    SessionRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn finalize_recording(
        &self,
        session_id: &Uuid,
        transcript: &str,
        duration_ms: u64,
        label: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE ai_sessions SET transcript = ?, duration_ms = ?, label = ? WHERE id = ?",
        )
        .bind(transcript)
        .bind(duration_ms as i64)
        .bind(label)
        .bind(session_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn save_final_summary(
        &self,
        session_id: &Uuid,
        summary: &str,
    ) -> Result<(), RepositoryError> {
        // summarized is one-way: a re-run rewrites the text, never clears
        // the flag.
        let result = sqlx::query("UPDATE ai_sessions SET summary = ?, summarized = 1 WHERE id = ?")
            .bind(summary)
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn link_commit(&self, session_id: &Uuid, commit_id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE ai_sessions SET related_commit_id = ? WHERE id = ?")
            .bind(commit_id)
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<AiSession>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM ai_sessions ORDER BY started_at DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_into_sessions(rows)
    }

    async fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        tool: Option<&str>,
    ) -> Result<Vec<AiSession>, RepositoryError> {
        let rows = match tool {
            Some(tool) => {
                sqlx::query(
                    r#"SELECT * FROM ai_sessions
                       WHERE started_at >= ? AND started_at < ? AND tool = ?
                       ORDER BY started_at DESC"#,
                )
                .bind(format_datetime(&start))
                .bind(format_datetime(&end))
                .bind(tool)
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query(
                    r#"SELECT * FROM ai_sessions
                       WHERE started_at >= ? AND started_at < ?
                       ORDER BY started_at DESC"#,
                )
                .bind(format_datetime(&start))
                .bind(format_datetime(&end))
                .fetch_all(&self.pool.reader)
                .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_into_sessions(rows)
    }

    async fn search(&self, term: &str, limit: i64) -> Result<Vec<AiSession>, RepositoryError> {
        let pattern = format!("%{term}%");
        let rows = sqlx::query(
            r#"SELECT * FROM ai_sessions
               WHERE label LIKE ? OR summary LIKE ?
               ORDER BY started_at DESC LIMIT ?"#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_into_sessions(rows)
    }
}
