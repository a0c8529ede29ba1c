//! Activity display commands: show, ai, timeline, search, stats, digest.

use anyhow::Result;
use chrono::Utc;
use console::style;

use chronicle_core::repository::{CommitRepository, SessionRepository};
use chronicle_core::service::{daily_digest, Period, TimelineEntry};

use crate::cli::format;
use crate::state::AppState;

/// Show commits for a period.
pub async fn show(state: &AppState, period: Period, repo: Option<&str>, json: bool) -> Result<()> {
    let commits = state.activity().commits_in(period, repo).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&commits)?);
        return Ok(());
    }

    if commits.is_empty() {
        println!("  {} No commits in this period.", style("i").blue().bold());
        return Ok(());
    }

    println!();
    println!("{}", format::commits_table(&commits));
    println!(
        "  {} commit{}",
        style(commits.len()).bold(),
        if commits.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Show AI-tool sessions for a period.
pub async fn ai(state: &AppState, period: Period, tool: Option<&str>, json: bool) -> Result<()> {
    let sessions = state.activity().sessions_in(period, tool).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!(
            "  {} No sessions in this period. Record one with: {}",
            style("i").blue().bold(),
            style("chronicle record claude").yellow()
        );
        return Ok(());
    }

    println!();
    println!("{}", format::sessions_table(&sessions));
    Ok(())
}

/// Merged commit + session timeline.
pub async fn timeline(state: &AppState, period: Period, repo: Option<&str>, json: bool) -> Result<()> {
    let entries = state.activity().timeline(period, repo).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("  {} Nothing recorded in this period.", style("i").blue().bold());
        return Ok(());
    }

    println!();
    for entry in &entries {
        match entry {
            TimelineEntry::Commit(commit) => {
                println!(
                    "  {} {} {} {}",
                    style(commit.timestamp.format("%m-%d %H:%M")).dim(),
                    style("commit ").yellow(),
                    style(commit.short_sha()).yellow(),
                    format::truncate(commit.subject(), 70)
                );
            }
            TimelineEntry::Session(session) => {
                println!(
                    "  {} {} {} ({})",
                    style(session.started_at.format("%m-%d %H:%M")).dim(),
                    style("session").cyan(),
                    session.tool,
                    session
                        .duration_ms
                        .map(format::format_duration_ms)
                        .unwrap_or_else(|| "active".to_string())
                );
            }
        }
    }
    println!();
    Ok(())
}

/// Search commits and sessions for a term.
pub async fn search(state: &AppState, term: &str, limit: i64, json: bool) -> Result<()> {
    let commits = state.commits().search(term, limit).await?;
    let sessions = state.sessions().search(term, limit).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "term": term,
                "commits": commits,
                "sessions": sessions,
            }))?
        );
        return Ok(());
    }

    println!();
    println!("  Results for '{}'", style(term).cyan().bold());
    println!();

    if commits.is_empty() && sessions.is_empty() {
        println!("  {} No matches.", style("i").blue().bold());
        return Ok(());
    }

    if !commits.is_empty() {
        println!("  Commits:");
        println!("{}", format::commits_table(&commits));
        println!();
    }
    if !sessions.is_empty() {
        println!("  Sessions:");
        println!("{}", format::sessions_table(&sessions));
        println!();
    }
    Ok(())
}

/// Per-tool usage statistics.
pub async fn stats(state: &AppState, days: i64, json: bool) -> Result<()> {
    let stats = state.activity().tool_stats(days).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if stats.is_empty() {
        println!("  {} No sessions in the last {days} days.", style("i").blue().bold());
        return Ok(());
    }

    let mut table = format::base_table(&["Tool", "Sessions", "Total time"]);
    let mut tools: Vec<_> = stats.iter().collect();
    tools.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    for (tool, stat) in tools {
        table.add_row(vec![
            comfy_table::Cell::new(tool).fg(comfy_table::Color::Cyan),
            comfy_table::Cell::new(stat.count.to_string()),
            comfy_table::Cell::new(format::format_duration_ms(stat.total_duration_ms)),
        ]);
    }

    println!();
    println!("  AI tool usage, last {} days", style(days).bold());
    println!();
    println!("{table}");
    Ok(())
}

/// One-paragraph digest of today's activity.
pub async fn digest(state: &AppState, json: bool) -> Result<()> {
    let activity = state.activity();
    let commits = activity.commits_in(Period::Today, None).await?;
    let sessions = activity.sessions_in(Period::Today, None).await?;

    if commits.is_empty() && sessions.is_empty() {
        println!("  {} Nothing recorded today.", style("i").blue().bold());
        return Ok(());
    }

    let commit_lines: Vec<String> = commits.iter().map(|c| c.subject().to_string()).collect();
    let session_lines: Vec<String> = sessions
        .iter()
        .map(|s| {
            s.summary
                .as_deref()
                .and_then(|sum| sum.lines().next())
                .unwrap_or(&s.label)
                .to_string()
        })
        .collect();

    let provider = state.provider()?;
    let summary = daily_digest(
        &state.ledger(),
        &provider,
        &state.config.models,
        Utc::now().date_naive(),
        commit_lines,
        session_lines,
    )
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!(
        "  Digest for {} ({} commits, {} sessions)",
        style(summary.date).bold(),
        summary.commits_count,
        summary.sessions_count
    );
    println!();
    println!("{}", summary.summary);
    println!();
    Ok(())
}
