//! Session commands: list, show, summarize.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use chronicle_core::repository::{CheckpointRepository, SessionRepository};
use chronicle_types::error::SummarizeError;

use crate::cli::format;
use crate::state::AppState;

/// List recent sessions.
pub async fn list(state: &AppState, limit: i64, json: bool) -> Result<()> {
    let sessions = state.sessions().list_recent(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!(
            "  {} No sessions recorded yet. Start one with: {}",
            style("i").blue().bold(),
            style("chronicle record claude").yellow()
        );
        return Ok(());
    }

    println!();
    println!("{}", format::sessions_table(&sessions));
    println!(
        "  {}",
        style("Use 'chronicle session <id>' for details").dim()
    );
    Ok(())
}

/// Show one session in detail, including its chunk checkpoints.
pub async fn show(state: &AppState, id: Uuid, json: bool) -> Result<()> {
    let session = state
        .sessions()
        .get(&id)
        .await?
        .with_context(|| format!("Session '{id}' not found"))?;

    let chunks = state.checkpoints().load_chunks(&id).await?;

    if json {
        let export = serde_json::json!({
            "session": session,
            "chunks": chunks.iter().map(|c| serde_json::json!({
                "chunk_number": c.chunk_number,
                "lines": format!("{}-{}", c.start_line, c.end_line),
                "summary": c.chunk_summary,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    println!();
    println!("  Session {}", style(id.to_string()).yellow().bold());
    println!();
    println!("  Tool: {}", style(&session.tool).cyan());
    println!(
        "  Started: {}",
        session.started_at.format("%B %d, %Y at %H:%M")
    );
    if let Some(ms) = session.duration_ms {
        println!("  Duration: {}", format::format_duration_ms(ms));
    }
    if let Some(commit_id) = session.related_commit_id {
        println!("  Linked commit: #{commit_id}");
    }
    println!();

    match (&session.summary, &session.transcript) {
        (Some(summary), _) => {
            println!("  {}", style("Summary").bold());
            println!();
            for line in summary.lines() {
                println!("  {line}");
            }
        }
        (None, Some(transcript)) => {
            println!(
                "  {} No summary yet. Generate one with: {}",
                style("i").blue().bold(),
                style(format!("chronicle summarize {id}")).yellow()
            );
            println!();
            println!("  {}", style("Transcript preview").bold());
            let preview: String = transcript.chars().take(1_000).collect();
            println!("{}", style(preview).dim());
        }
        (None, None) => {
            println!("  {} Session still active or transcript missing.", style("i").blue());
        }
    }

    if !chunks.is_empty() {
        println!();
        println!(
            "  {}",
            style(format!("{} summarization checkpoints", chunks.len())).dim()
        );
    }
    println!();
    Ok(())
}

/// Generate (or resume) a session summary.
pub async fn summarize(state: &AppState, id: Uuid, force: bool, json: bool) -> Result<()> {
    if force && !json {
        let confirmed = Confirm::new()
            .with_prompt("Discard existing checkpoints and redo every chunk?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let orchestrator = state.orchestrator()?;

    let spinner = if json {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("  {spinner} {msg}").expect("valid template"),
        );
        spinner.set_message("summarizing...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(120));
        spinner
    };

    let result = if force {
        orchestrator.resummarize(id).await
    } else {
        orchestrator.summarize(id).await
    };
    spinner.finish_and_clear();

    match result {
        Ok(summary) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({"session_id": id.to_string(), "summary": summary})
                );
            } else {
                println!();
                println!("  {} Summary ready:", style("✓").green().bold());
                println!();
                for line in summary.lines() {
                    println!("  {line}");
                }
                println!();
            }
            Ok(())
        }
        Err(SummarizeError::ChunkRetryExhausted {
            chunk_number,
            completed_chunks,
            partial_summary,
            source,
        }) => {
            // Partial progress is persisted; surface it rather than dropping it.
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "session_id": id.to_string(),
                        "error": format!("chunk {chunk_number} failed: {source}"),
                        "completed_chunks": completed_chunks,
                        "partial_summary": partial_summary,
                    })
                );
            } else {
                println!(
                    "  {} Chunk {} failed after retries ({}); progress is saved.",
                    style("✗").red().bold(),
                    chunk_number,
                    source
                );
                println!(
                    "  {}",
                    style("Re-run 'chronicle summarize' later to resume from the failed chunk.").dim()
                );
                println!();
                for line in partial_summary.lines() {
                    println!("  {line}");
                }
            }
            anyhow::bail!("summarization incomplete")
        }
        Err(err) => Err(err.into()),
    }
}
