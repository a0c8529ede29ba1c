//! Repository tracking commands: add, sync, stats.

use anyhow::{Context, Result};
use console::style;

use chronicle_core::repository::CommitRepository;
use chronicle_infra::git::sync_repository;

use crate::cli::format;
use crate::state::AppState;

/// Track a repository and import its recent commits.
pub async fn add(state: &mut AppState, path: &str, limit: usize, json: bool) -> Result<()> {
    let commits = state.commits();
    let added = sync_repository(&commits, path, limit)
        .await
        .with_context(|| format!("could not scan {path}"))?;

    let canonical = std::fs::canonicalize(path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.to_string());
    state.config.add_repository(&canonical);
    state.config_store.save(&state.config)?;

    if json {
        println!(
            "{}",
            serde_json::json!({"repo_path": canonical, "commits_added": added.len()})
        );
        return Ok(());
    }

    println!(
        "  {} Added {} commits from {}",
        style("✓").green().bold(),
        style(added.len()).bold(),
        style(&canonical).cyan()
    );
    if let Some(latest) = added.first() {
        println!(
            "  {}",
            style(format!("Latest: {} - {}", latest.short_sha(), format::truncate(latest.subject(), 60))).dim()
        );
    }
    Ok(())
}

/// Re-scan one repository, or every tracked repository.
pub async fn sync(state: &AppState, path: Option<&str>, limit: usize, json: bool) -> Result<()> {
    let commits = state.commits();

    let targets: Vec<String> = match path {
        Some(path) => vec![path.to_string()],
        None => state.config.repositories.clone(),
    };

    if targets.is_empty() {
        println!(
            "  {} No repositories tracked yet. Add one with: {}",
            style("i").blue().bold(),
            style("chronicle repo add <path>").yellow()
        );
        return Ok(());
    }

    let mut total = 0;
    for target in &targets {
        let added = sync_repository(&commits, target, limit)
            .await
            .with_context(|| format!("could not sync {target}"))?;
        total += added.len();

        if !json {
            if added.is_empty() {
                println!("  {} {} up to date", style("·").dim(), style(target).cyan());
            } else {
                println!(
                    "  {} {} new commits from {}",
                    style("✓").green().bold(),
                    style(added.len()).bold(),
                    style(target).cyan()
                );
            }
        }
    }

    if json {
        println!(
            "{}",
            serde_json::json!({"repositories": targets.len(), "commits_added": total})
        );
    }
    Ok(())
}

/// Show statistics for one repository.
pub async fn stats(state: &AppState, path: &str, json: bool) -> Result<()> {
    let canonical = std::fs::canonicalize(path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.to_string());

    let stats = state.commits().stats(&canonical).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("  Repository {}", style(&stats.repo_path).cyan().bold());
    println!();
    println!("  Commits tracked: {}", style(stats.total_commits).bold());
    println!("  Authors: {}", stats.authors.join(", "));
    if let Some(latest) = &stats.latest_commit {
        println!(
            "  Latest: {} {} ({})",
            style(latest.short_sha()).yellow(),
            format::truncate(latest.subject(), 60),
            latest.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
    Ok(())
}
