//! Milestone and next-step commands.

use anyhow::{Context, Result};
use console::style;
use uuid::Uuid;

use chronicle_types::milestone::{MilestoneKind, MilestoneStatus};

use crate::cli::format;
use crate::state::AppState;

pub async fn add_milestone(
    state: &AppState,
    title: &str,
    kind: &str,
    priority: u8,
    description: Option<String>,
    tags: Option<String>,
    json: bool,
) -> Result<()> {
    let kind: MilestoneKind = kind.parse().map_err(anyhow::Error::msg)?;
    let tags = tags
        .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    let milestone = state
        .milestones()
        .add_milestone(title, kind, priority, description, tags)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&milestone)?);
    } else {
        println!(
            "  {} Milestone '{}' created ({})",
            style("✓").green().bold(),
            style(&milestone.title).cyan(),
            style(milestone.id.to_string()).yellow()
        );
    }
    Ok(())
}

pub async fn list_milestones(state: &AppState, status: Option<&str>, json: bool) -> Result<()> {
    let status = status
        .map(|s| s.parse::<MilestoneStatus>())
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let milestones = state.milestones().list_milestones(status).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&milestones)?);
        return Ok(());
    }

    if milestones.is_empty() {
        println!(
            "  {} No milestones yet. Add one with: {}",
            style("i").blue().bold(),
            style("chronicle milestone add \"...\"").yellow()
        );
        return Ok(());
    }

    println!();
    println!("{}", format::milestones_table(&milestones));
    Ok(())
}

pub async fn complete_milestone(state: &AppState, id: Uuid, json: bool) -> Result<()> {
    state
        .milestones()
        .set_milestone_status(&id, MilestoneStatus::Completed)
        .await
        .with_context(|| format!("Milestone '{id}' not found"))?;

    if json {
        println!("{}", serde_json::json!({"completed": true, "id": id.to_string()}));
    } else {
        println!("  {} Milestone completed.", style("✓").green().bold());
    }
    Ok(())
}

pub async fn add_step(
    state: &AppState,
    description: &str,
    priority: u8,
    category: &str,
    milestone: Option<Uuid>,
    json: bool,
) -> Result<()> {
    let step = state
        .milestones()
        .add_step(description, priority, category, milestone)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&step)?);
    } else {
        println!(
            "  {} Next step added ({})",
            style("✓").green().bold(),
            style(step.id.to_string()).yellow()
        );
    }
    Ok(())
}

pub async fn list_steps(state: &AppState, all: bool, json: bool) -> Result<()> {
    let steps = state.milestones().list_steps(all).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&steps)?);
        return Ok(());
    }

    if steps.is_empty() {
        println!("  {} Nothing pending.", style("i").blue().bold());
        return Ok(());
    }

    println!();
    println!("{}", format::steps_table(&steps));
    Ok(())
}

pub async fn complete_step(state: &AppState, id: Uuid, json: bool) -> Result<()> {
    state
        .milestones()
        .complete_step(&id)
        .await
        .with_context(|| format!("Step '{id}' not found"))?;

    if json {
        println!("{}", serde_json::json!({"completed": true, "id": id.to_string()}));
    } else {
        println!("  {} Step completed.", style("✓").green().bold());
    }
    Ok(())
}
