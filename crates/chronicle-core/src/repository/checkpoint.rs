//! CheckpointRepository trait definition.
//!
//! Chunk checkpoints are keyed by (session_id, chunk_number). `save_chunk`
//! is an upsert -- any prior record for the key is removed before the new
//! one is written, so re-running a chunk never leaves duplicates. Defined
//! under an at-most-one-writer-per-session assumption.

use chronicle_types::error::RepositoryError;
use chronicle_types::summary::ChunkCheckpoint;
use uuid::Uuid;

/// Repository trait for summarization chunk checkpoints.
///
/// Implementations live in chronicle-infra (e.g., `SqliteCheckpointRepository`).
pub trait CheckpointRepository: Send + Sync {
    /// Upsert one chunk's checkpoint. Replaces any existing record for
    /// the same (session_id, chunk_number).
    fn save_chunk(
        &self,
        checkpoint: &ChunkCheckpoint,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All checkpoints for a session, ordered by chunk number ascending.
    fn load_chunks(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChunkCheckpoint>, RepositoryError>> + Send;

    /// Delete every checkpoint for a session (forced re-run).
    fn clear_chunks(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
