//! Interactive session recording.
//!
//! Launches the tool under `script(1)` so every byte of terminal I/O lands
//! in a transcript file. When the tool exits, the transcript is cleaned
//! and stored on the session row; the summary is generated lazily on
//! first request, not here.

use std::process::Command;
use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use chronicle_core::repository::SessionRepository;
use chronicle_infra::transcript::clean_transcript;
use chronicle_types::session::AiSession;

use crate::state::AppState;

/// Start a recorded interactive session with a tool.
pub async fn record(state: &AppState, tool: &str, command: Option<&str>, json: bool) -> Result<()> {
    let actual_command = command.unwrap_or(tool);

    let working_directory = std::env::current_dir()
        .ok()
        .map(|p| p.display().to_string());
    let repo_path = working_directory
        .as_deref()
        .and_then(find_repo_root);

    let session = AiSession::started(tool, working_directory, repo_path);
    let sessions = state.sessions();
    sessions.create(&session).await?;

    let recordings = state.recordings_dir();
    std::fs::create_dir_all(&recordings)
        .with_context(|| format!("could not create {}", recordings.display()))?;
    let transcript_file = recordings.join(format!("session_{}.log", session.id));

    if !json {
        println!(
            "  {} Session {} started - all terminal activity is recorded",
            style("●").red().bold(),
            style(session.id.to_string()).yellow()
        );
        println!("  Launching {}...", style(actual_command).cyan());
        println!();
    }

    // script(1) captures the full interactive exchange; -q keeps its own
    // banner out, -f flushes as the session runs.
    let started = Instant::now();
    let status = Command::new("script")
        .arg("-q")
        .arg("-f")
        .arg(&transcript_file)
        .arg("-c")
        .arg(actual_command)
        .status()
        .with_context(|| format!("could not launch '{actual_command}' under script(1)"))?;
    let duration_ms = started.elapsed().as_millis() as u64;

    let raw = std::fs::read_to_string(&transcript_file).unwrap_or_default();
    let cleaned = clean_transcript(&raw);
    let label = format!(
        "Interactive {tool} session ({})",
        crate::cli::format::format_duration_ms(duration_ms)
    );

    sessions
        .finalize_recording(&session.id, &cleaned, duration_ms, &label)
        .await?;

    // Best-effort: attach the session to a commit made right after it.
    if let Ok(Some(stored)) = sessions.get(&session.id).await {
        let _ = state.activity().link_session_to_commit(&stored).await;
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "session_id": session.id.to_string(),
                "duration_ms": duration_ms,
                "transcript_chars": cleaned.len(),
                "exit_code": status.code(),
            })
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Session {} complete ({}, {} chars captured)",
        style("✓").green().bold(),
        style(session.id.to_string()).yellow(),
        crate::cli::format::format_duration_ms(duration_ms),
        cleaned.len()
    );
    println!(
        "  {}",
        style(format!(
            "Summarize it with: chronicle summarize {}",
            session.id
        ))
        .dim()
    );
    Ok(())
}

/// Walk up from a directory looking for a `.git` marker.
fn find_repo_root(start: &str) -> Option<String> {
    let mut current = std::path::Path::new(start);
    loop {
        if current.join(".git").exists() {
            return Some(current.display().to_string());
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_repo_root_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let root = find_repo_root(nested.to_str().unwrap()).unwrap();
        assert_eq!(root, dir.path().display().to_string());
    }

    #[test]
    fn test_find_repo_root_none_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_repo_root(dir.path().to_str().unwrap()).is_none());
    }
}
