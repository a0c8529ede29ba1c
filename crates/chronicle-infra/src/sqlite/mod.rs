//! SQLite persistence layer.
//!
//! One repository struct per chronicle-core trait, all sharing a split
//! reader/writer `DatabasePool` in WAL mode. Rows map through private Row
//! structs; timestamps are RFC 3339 TEXT, quota dates are YYYY-MM-DD TEXT.

pub mod checkpoint;
pub mod commit;
pub mod milestone;
pub mod pool;
pub mod quota;
pub mod session;

pub use checkpoint::SqliteCheckpointRepository;
pub use commit::SqliteCommitRepository;
pub use milestone::{SqliteMilestoneRepository, SqliteNextStepRepository};
pub use pool::{default_database_url, DatabasePool};
pub use quota::SqliteQuotaLedger;
pub use session::SqliteSessionRepository;

use chronicle_types::error::RepositoryError;
use chrono::{DateTime, Utc};

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
