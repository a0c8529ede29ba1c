//! Git commit records captured by the repository scanner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One git commit tracked from a scanned repository.
///
/// `id` is the database rowid (0 until persisted). A commit is identified
/// logically by the (sha, repo_path) pair -- the same sha may appear in
/// several tracked checkouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub sha: String,
    pub message: String,
    pub author: String,
    pub branch: Option<String>,
    pub repo_path: String,
    pub files_changed: Vec<String>,
}

impl Commit {
    /// First line of the commit message, for table display.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Abbreviated sha (first 8 chars).
    pub fn short_sha(&self) -> &str {
        &self.sha[..self.sha.len().min(8)]
    }
}

/// Aggregate statistics for one tracked repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoStats {
    pub repo_path: String,
    pub total_commits: u64,
    pub authors: Vec<String>,
    pub latest_commit: Option<Commit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(sha: &str, message: &str) -> Commit {
        Commit {
            id: 1,
            timestamp: Utc::now(),
            sha: sha.to_string(),
            message: message.to_string(),
            author: "dev <dev@example.com>".to_string(),
            branch: Some("main".to_string()),
            repo_path: "/tmp/repo".to_string(),
            files_changed: vec!["src/main.rs".to_string()],
        }
    }

    #[test]
    fn test_subject_is_first_line() {
        let c = commit("abc123", "Add quota ledger\n\nLong body here.");
        assert_eq!(c.subject(), "Add quota ledger");
    }

    #[test]
    fn test_short_sha_truncates() {
        let c = commit("0123456789abcdef", "msg");
        assert_eq!(c.short_sha(), "01234567");
        let c = commit("ab12", "msg");
        assert_eq!(c.short_sha(), "ab12");
    }
}
