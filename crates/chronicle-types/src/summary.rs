//! Summary checkpoint and daily-summary types.
//!
//! A `ChunkCheckpoint` is the persisted outcome of one transcript chunk:
//! the chunk's own summary plus the cumulative summary up to and including
//! it. Checkpoints make summarization resumable -- a completed session has
//! chunk numbers forming a contiguous run 1..N with no gaps.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted outcome of one summarized transcript chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkCheckpoint {
    pub session_id: Uuid,
    /// 1-based chunk number within the session's plan.
    pub chunk_number: u32,
    /// Half-open line range `[start_line, end_line)` of the transcript.
    pub start_line: u32,
    pub end_line: u32,
    /// Summary of just this chunk's text.
    pub chunk_summary: String,
    /// Running summary of chunks 1..=chunk_number. Derived only from the
    /// previous chunk's cumulative summary and this chunk's raw text.
    pub cumulative_summary: String,
    pub written_at: DateTime<Utc>,
}

/// One day's rolled-up development summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub summary: String,
    pub commits_count: u32,
    pub sessions_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_serde_roundtrip() {
        let checkpoint = ChunkCheckpoint {
            session_id: Uuid::now_v7(),
            chunk_number: 3,
            start_line: 6000,
            end_line: 9000,
            chunk_summary: "Ran the test suite.".to_string(),
            cumulative_summary: "Built the parser, then ran the test suite.".to_string(),
            written_at: Utc::now(),
        };
        let json = serde_json::to_string(&checkpoint).unwrap();
        let parsed: ChunkCheckpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.chunk_number, 3);
        assert_eq!(parsed.start_line, 6000);
        assert_eq!(parsed.cumulative_summary, checkpoint.cumulative_summary);
    }
}
