//! AI-tool session types.
//!
//! A session is one recorded run of an interactive tool (claude, gemini,
//! vim, ...) with its captured terminal transcript. The summarization
//! engine writes `summary` and flips `summarized` exactly once; every
//! other field is owned by the recorder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One recorded development session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Tool that was recorded (e.g., "claude", "gemini", "vim").
    pub tool: String,
    /// One-line label, e.g. "Interactive session (42.0m)".
    pub label: String,
    /// Narrative summary, present once the engine has completed.
    pub summary: Option<String>,
    /// Cleaned, line-oriented transcript. `None` while the session is live.
    pub transcript: Option<String>,
    pub duration_ms: Option<u64>,
    /// One-way flag set when the final summary is written.
    pub summarized: bool,
    pub working_directory: Option<String>,
    /// Git repository root the session started in, if any.
    pub repo_path: Option<String>,
    /// Commit recorded shortly after this session, if one was linked.
    pub related_commit_id: Option<i64>,
}

impl AiSession {
    /// Create a new live session for a tool. Transcript and summary are
    /// filled in later by the recorder and the engine respectively.
    pub fn started(tool: &str, working_directory: Option<String>, repo_path: Option<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            started_at: Utc::now(),
            tool: tool.to_string(),
            label: format!("Interactive {tool} session"),
            summary: None,
            transcript: None,
            duration_ms: None,
            summarized: false,
            working_directory,
            repo_path,
            related_commit_id: None,
        }
    }

    /// Whether the session still needs a summary generated.
    pub fn needs_summary(&self) -> bool {
        !self.summarized && self.transcript.is_some()
    }
}

/// Lifecycle state derived from a session's fields, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    NeedsSummary,
    Summarized,
}

impl SessionState {
    /// Derive the display state from a session record.
    pub fn of(session: &AiSession) -> Self {
        if session.transcript.is_none() {
            SessionState::Active
        } else if session.summarized {
            SessionState::Summarized
        } else {
            SessionState::NeedsSummary
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Active => write!(f, "active"),
            SessionState::NeedsSummary => write!(f, "needs_summary"),
            SessionState::Summarized => write!(f, "summarized"),
        }
    }
}

impl FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SessionState::Active),
            "needs_summary" => Ok(SessionState::NeedsSummary),
            "summarized" => Ok(SessionState::Summarized),
            other => Err(format!("invalid session state: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_started_session_is_active() {
        let session = AiSession::started("claude", None, None);
        assert_eq!(SessionState::of(&session), SessionState::Active);
        assert!(!session.needs_summary());
    }

    #[test]
    fn test_needs_summary_after_transcript() {
        let mut session = AiSession::started("claude", None, None);
        session.transcript = Some("$ cargo test\nok".to_string());
        assert!(session.needs_summary());
        assert_eq!(SessionState::of(&session), SessionState::NeedsSummary);

        session.summarized = true;
        assert!(!session.needs_summary());
        assert_eq!(SessionState::of(&session), SessionState::Summarized);
    }

    #[test]
    fn test_session_state_roundtrip() {
        for state in [
            SessionState::Active,
            SessionState::NeedsSummary,
            SessionState::Summarized,
        ] {
            let s = state.to_string();
            let parsed: SessionState = s.parse().unwrap();
            assert_eq!(state, parsed);
        }
    }
}
