//! Activity queries: commits, sessions, and the combined timeline.
//!
//! Thin orchestration over `CommitRepository` and `SessionRepository`;
//! all date math happens here so the repositories stay plain range scans.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use chronicle_types::commit::Commit;
use chronicle_types::error::RepositoryError;
use chronicle_types::session::AiSession;

use crate::repository::{CommitRepository, SessionRepository};

/// Window a session-to-commit link may span.
const COMMIT_LINK_WINDOW_MINUTES: i64 = 30;

/// Reporting period for activity queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Yesterday,
    Week,
}

impl Period {
    /// Half-open `[start, end)` bounds of the period relative to `now`.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc();

        match self {
            Period::Today => (today_start, now),
            Period::Yesterday => (today_start - Duration::days(1), today_start),
            Period::Week => (now - Duration::days(7), now),
        }
    }
}

/// One entry in the merged commit/session timeline.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEntry {
    Commit(Commit),
    Session(AiSession),
}

impl TimelineEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TimelineEntry::Commit(c) => c.timestamp,
            TimelineEntry::Session(s) => s.started_at,
        }
    }
}

/// Per-tool usage counters over a lookback window.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolStats {
    pub count: u64,
    pub total_duration_ms: u64,
}

/// Read-mostly facade over commit and session storage.
pub struct ActivityService<C, S> {
    commits: C,
    sessions: S,
}

impl<C: CommitRepository, S: SessionRepository> ActivityService<C, S> {
    pub fn new(commits: C, sessions: S) -> Self {
        Self { commits, sessions }
    }

    pub fn commits(&self) -> &C {
        &self.commits
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Commits within a period, optionally scoped to one repository.
    pub async fn commits_in(
        &self,
        period: Period,
        repo_path: Option<&str>,
    ) -> Result<Vec<Commit>, RepositoryError> {
        let (start, end) = period.bounds(Utc::now());
        self.commits.list_by_date_range(start, end, repo_path).await
    }

    /// Sessions within a period, optionally filtered by tool name.
    pub async fn sessions_in(
        &self,
        period: Period,
        tool: Option<&str>,
    ) -> Result<Vec<AiSession>, RepositoryError> {
        let (start, end) = period.bounds(Utc::now());
        self.sessions.list_by_date_range(start, end, tool).await
    }

    /// Merged commit + session timeline, newest first.
    pub async fn timeline(
        &self,
        period: Period,
        repo_path: Option<&str>,
    ) -> Result<Vec<TimelineEntry>, RepositoryError> {
        let commits = self.commits_in(period, repo_path).await?;
        let sessions = self.sessions_in(period, None).await?;

        let mut entries: Vec<TimelineEntry> = commits
            .into_iter()
            .map(TimelineEntry::Commit)
            .chain(sessions.into_iter().map(TimelineEntry::Session))
            .collect();
        entries.sort_by_key(|e| std::cmp::Reverse(e.timestamp()));
        Ok(entries)
    }

    /// Usage counters per tool over the last `days` days.
    pub async fn tool_stats(&self, days: i64) -> Result<HashMap<String, ToolStats>, RepositoryError> {
        let now = Utc::now();
        let sessions = self
            .sessions
            .list_by_date_range(now - Duration::days(days), now, None)
            .await?;

        let mut stats: HashMap<String, ToolStats> = HashMap::new();
        for session in sessions {
            let entry = stats.entry(session.tool.clone()).or_default();
            entry.count += 1;
            entry.total_duration_ms += session.duration_ms.unwrap_or(0);
        }
        Ok(stats)
    }

    /// Link a session to the first commit recorded within 30 minutes of
    /// its start, if one exists.
    pub async fn link_session_to_commit(&self, session: &AiSession) -> Result<bool, RepositoryError> {
        let end = session.started_at + Duration::minutes(COMMIT_LINK_WINDOW_MINUTES);
        match self.commits.first_in_range(session.started_at, end).await? {
            Some(commit) => {
                self.sessions.link_commit(&session.id, commit.id).await?;
                tracing::debug!(
                    session_id = %session.id,
                    commit = commit.short_sha(),
                    "linked session to commit"
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_period_bounds_today() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 15, 30, 0).unwrap();
        let (start, end) = Period::Today.bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 7, 0, 0, 0).unwrap());
        assert_eq!(end, now);
    }

    #[test]
    fn test_period_bounds_yesterday() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 15, 30, 0).unwrap();
        let (start, end) = Period::Yesterday.bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 6, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 8, 7, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_period_bounds_week() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 15, 30, 0).unwrap();
        let (start, end) = Period::Week.bounds(now);
        assert_eq!(start, now - Duration::days(7));
        assert_eq!(end, now);
    }
}
