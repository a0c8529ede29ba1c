//! Query handlers: sessions, commits, timeline, stats.
//!
//! Result caps mirror the CLI defaults: 100 sessions/commits per listing,
//! 50 search hits.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chronicle_core::repository::{CheckpointRepository, CommitRepository, SessionRepository};
use chronicle_types::session::{AiSession, SessionState};

use crate::http::ApiError;
use crate::state::AppState;

const MAX_LIST: i64 = 100;
const MAX_SEARCH: i64 = 50;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Session view without the (potentially huge) transcript body.
#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub id: Uuid,
    pub tool: String,
    pub started_at: String,
    pub label: String,
    pub state: SessionState,
    pub duration_minutes: Option<f64>,
    pub summary: Option<String>,
    pub summarized: bool,
    pub repo_path: Option<String>,
    pub working_directory: Option<String>,
    pub related_commit_id: Option<i64>,
}

impl From<AiSession> for SessionDto {
    fn from(session: AiSession) -> Self {
        Self {
            id: session.id,
            tool: session.tool.clone(),
            started_at: session.started_at.to_rfc3339(),
            label: session.label.clone(),
            state: SessionState::of(&session),
            duration_minutes: session.duration_ms.map(|ms| (ms as f64 / 60_000.0 * 10.0).round() / 10.0),
            summary: session.summary,
            summarized: session.summarized,
            repo_path: session.repo_path,
            working_directory: session.working_directory,
            related_commit_id: session.related_commit_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub tool: Option<String>,
    pub repo: Option<String>,
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = params.limit.unwrap_or(10).min(MAX_LIST);
    let repo = state.sessions();

    let sessions = match params.days {
        Some(days) => {
            let now = Utc::now();
            repo.list_by_date_range(now - Duration::days(days), now, params.tool.as_deref())
                .await?
        }
        None => {
            let mut sessions = repo.list_recent(limit).await?;
            if let Some(tool) = &params.tool {
                sessions.retain(|s| &s.tool == tool);
            }
            sessions
        }
    };

    let dtos: Vec<SessionDto> = sessions
        .into_iter()
        .take(limit as usize)
        .map(Into::into)
        .collect();

    Ok(Json(serde_json::json!({
        "count": dtos.len(),
        "sessions": dtos,
    })))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state
        .sessions()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("session {id} not found")))?;

    let chunks = state.checkpoints().load_chunks(&id).await?;
    let chunk_views: Vec<serde_json::Value> = chunks
        .iter()
        .map(|c| {
            serde_json::json!({
                "chunk_number": c.chunk_number,
                "lines": format!("{}-{}", c.start_line, c.end_line),
                "summary": c.chunk_summary,
            })
        })
        .collect();

    let mut body = serde_json::to_value(SessionDto::from(session))
        .map_err(|e| ApiError::internal(e.to_string()))?;
    body["chunked_summaries"] = serde_json::Value::Array(chunk_views);

    Ok(Json(body))
}

pub async fn search_sessions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = params.limit.unwrap_or(10).min(MAX_SEARCH);
    let sessions = state.sessions().search(&params.q, limit).await?;
    let dtos: Vec<SessionDto> = sessions.into_iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "query": params.q,
        "count": dtos.len(),
        "sessions": dtos,
    })))
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

pub async fn list_commits(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = params.limit.unwrap_or(20).min(MAX_LIST);
    let repo = state.commits();

    let commits = match params.days {
        Some(days) => {
            let now = Utc::now();
            repo.list_by_date_range(now - Duration::days(days), now, params.repo.as_deref())
                .await?
                .into_iter()
                .take(limit as usize)
                .collect()
        }
        None => repo.list_recent(limit, params.repo.as_deref()).await?,
    };

    Ok(Json(serde_json::json!({
        "count": commits.len(),
        "commits": commits,
    })))
}

pub async fn search_commits(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = params.limit.unwrap_or(20).min(MAX_SEARCH);
    let commits = state.commits().search(&params.q, limit).await?;

    Ok(Json(serde_json::json!({
        "query": params.q,
        "count": commits.len(),
        "commits": commits,
    })))
}

// ---------------------------------------------------------------------------
// Timeline + stats
// ---------------------------------------------------------------------------

pub async fn timeline(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let days = params.days.unwrap_or(1);
    let now = Utc::now();
    let start = now - Duration::days(days);

    let commits = state
        .commits()
        .list_by_date_range(start, now, params.repo.as_deref())
        .await?;
    let sessions = state
        .sessions()
        .list_by_date_range(start, now, None)
        .await?;

    let mut entries: Vec<serde_json::Value> = Vec::new();
    for commit in &commits {
        entries.push(serde_json::json!({
            "type": "commit",
            "timestamp": commit.timestamp.to_rfc3339(),
            "data": commit,
        }));
    }
    for session in sessions.iter().cloned() {
        entries.push(serde_json::json!({
            "type": "session",
            "timestamp": session.started_at.to_rfc3339(),
            "data": SessionDto::from(session),
        }));
    }
    entries.sort_by(|a, b| b["timestamp"].as_str().cmp(&a["timestamp"].as_str()));

    Ok(Json(serde_json::json!({
        "days": days,
        "commits_count": commits.len(),
        "sessions_count": sessions.len(),
        "total_items": entries.len(),
        "timeline": entries,
    })))
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let days = params.days.unwrap_or(7);
    let now = Utc::now();
    let start = now - Duration::days(days);

    let commits = state.commits().list_by_date_range(start, now, None).await?;
    let sessions = state.sessions().list_by_date_range(start, now, None).await?;

    let total_duration_minutes: f64 = sessions
        .iter()
        .filter_map(|s| s.duration_ms)
        .map(|ms| ms as f64 / 60_000.0)
        .sum();

    let mut by_tool: std::collections::HashMap<&str, u64> = std::collections::HashMap::new();
    for session in &sessions {
        *by_tool.entry(session.tool.as_str()).or_insert(0) += 1;
    }

    let mut repos: std::collections::HashSet<&str> = std::collections::HashSet::new();
    repos.extend(commits.iter().map(|c| c.repo_path.as_str()));
    repos.extend(sessions.iter().filter_map(|s| s.repo_path.as_deref()));

    Ok(Json(serde_json::json!({
        "period_days": days,
        "total_sessions": sessions.len(),
        "total_commits": commits.len(),
        "total_duration_minutes": (total_duration_minutes * 10.0).round() / 10.0,
        "sessions_by_tool": by_tool,
        "unique_repositories": repos.len(),
    })))
}
