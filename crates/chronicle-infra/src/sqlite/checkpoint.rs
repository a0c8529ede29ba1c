//! SQLite checkpoint repository implementation.
//!
//! `save_chunk` runs delete-then-insert inside one transaction so a
//! re-run of a chunk never leaves duplicates and no half-written record
//! survives a failure.

use chronicle_core::repository::CheckpointRepository;
use chronicle_types::error::RepositoryError;
use chronicle_types::summary::ChunkCheckpoint;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `CheckpointRepository`.
pub struct SqliteCheckpointRepository {
    pool: DatabasePool,
}

impl SqliteCheckpointRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ChunkRow {
    session_id: String,
    chunk_number: i64,
    start_line: i64,
    end_line: i64,
    chunk_summary: String,
    cumulative_summary: String,
    written_at: String,
}

impl ChunkRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            session_id: row.try_get("session_id")?,
            chunk_number: row.try_get("chunk_number")?,
            start_line: row.try_get("start_line")?,
            end_line: row.try_get("end_line")?,
            chunk_summary: row.try_get("chunk_summary")?,
            cumulative_summary: row.try_get("cumulative_summary")?,
            written_at: row.try_get("written_at")?,
        })
    }

    fn into_checkpoint(self) -> Result<ChunkCheckpoint, RepositoryError> {
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| RepositoryError::Query(format!("invalid session_id: {e}")))?;
        let written_at = parse_datetime(&self.written_at)?;

        Ok(ChunkCheckpoint {
            session_id,
            chunk_number: self.chunk_number as u32,
            start_line: self.start_line as u32,
            end_line: self.end_line as u32,
            chunk_summary: self.chunk_summary,
            cumulative_summary: self.cumulative_summary,
            written_at,
        })
    }
}

impl CheckpointRepository for SqliteCheckpointRepository {
    async fn save_chunk(&self, checkpoint: &ChunkCheckpoint) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query("DELETE FROM session_summary_chunks WHERE session_id = ? AND chunk_number = ?")
            .bind(checkpoint.session_id.to_string())
            .bind(checkpoint.chunk_number as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO session_summary_chunks
               (session_id, chunk_number, start_line, end_line, chunk_summary, cumulative_summary, written_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(checkpoint.session_id.to_string())
        .bind(checkpoint.chunk_number as i64)
        .bind(checkpoint.start_line as i64)
        .bind(checkpoint.end_line as i64)
        .bind(&checkpoint.chunk_summary)
        .bind(&checkpoint.cumulative_summary)
        .bind(format_datetime(&checkpoint.written_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn load_chunks(&self, session_id: &Uuid) -> Result<Vec<ChunkCheckpoint>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM session_summary_chunks WHERE session_id = ? ORDER BY chunk_number ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                ChunkRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_checkpoint()
            })
            .collect()
    }

    async fn clear_chunks(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM session_summary_chunks WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}
