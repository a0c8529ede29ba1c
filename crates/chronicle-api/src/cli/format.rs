//! Table and text formatting helpers shared by the CLI commands.

use comfy_table::{presets, Cell, Color, ContentArrangement, Table};

use chronicle_types::commit::Commit;
use chronicle_types::milestone::{Milestone, MilestoneStatus, NextStep};
use chronicle_types::quota::QuotaRecord;
use chronicle_types::session::{AiSession, SessionState};

/// New table with the house preset.
pub fn base_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(|h| Cell::new(h).fg(Color::White)));
    table
}

pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

pub fn format_duration_ms(ms: u64) -> String {
    let total_secs = ms / 1_000;
    let hours = total_secs / 3_600;
    let mins = (total_secs % 3_600) / 60;

    if hours > 0 {
        format!("{hours}h {mins}m")
    } else if mins > 0 {
        format!("{mins}m")
    } else {
        format!("{total_secs}s")
    }
}

pub fn commits_table(commits: &[Commit]) -> Table {
    let mut table = base_table(&["Sha", "When", "Message", "Author", "Files"]);
    for commit in commits {
        table.add_row(vec![
            Cell::new(commit.short_sha()).fg(Color::Yellow),
            Cell::new(commit.timestamp.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
            Cell::new(truncate(commit.subject(), 60)).fg(Color::White),
            Cell::new(truncate(&commit.author, 25)).fg(Color::Cyan),
            Cell::new(commit.files_changed.len().to_string()).fg(Color::DarkGrey),
        ]);
    }
    table
}

pub fn sessions_table(sessions: &[AiSession]) -> Table {
    let mut table = base_table(&["Id", "Tool", "Started", "Duration", "Status", "Summary"]);
    for session in sessions {
        let duration = session
            .duration_ms
            .map(format_duration_ms)
            .unwrap_or_else(|| "active".to_string());

        let status_cell = match SessionState::of(session) {
            SessionState::Active => Cell::new("active").fg(Color::Yellow),
            SessionState::NeedsSummary => Cell::new("needs summary").fg(Color::Magenta),
            SessionState::Summarized => Cell::new("summarized").fg(Color::Green),
        };

        let summary = session
            .summary
            .as_deref()
            .map(|s| truncate(s.lines().next().unwrap_or(s), 40))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(session.id.to_string()).fg(Color::Yellow),
            Cell::new(&session.tool).fg(Color::Cyan),
            Cell::new(session.started_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
            Cell::new(duration).fg(Color::White),
            status_cell,
            Cell::new(summary).fg(Color::DarkGrey),
        ]);
    }
    table
}

pub fn milestones_table(milestones: &[Milestone]) -> Table {
    let mut table = base_table(&["Id", "Title", "Kind", "Priority", "Status", "Created"]);
    for milestone in milestones {
        let status_cell = match milestone.status {
            MilestoneStatus::Planned => Cell::new("planned").fg(Color::Yellow),
            MilestoneStatus::InProgress => Cell::new("in progress").fg(Color::Cyan),
            MilestoneStatus::Completed => Cell::new("completed").fg(Color::Green),
            MilestoneStatus::Archived => Cell::new("archived").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(milestone.id.to_string()).fg(Color::Yellow),
            Cell::new(truncate(&milestone.title, 45)).fg(Color::White),
            Cell::new(milestone.kind.to_string()).fg(Color::Cyan),
            Cell::new(format!("P{}", milestone.priority)).fg(Color::White),
            status_cell,
            Cell::new(milestone.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ]);
    }
    table
}

pub fn steps_table(steps: &[NextStep]) -> Table {
    let mut table = base_table(&["Id", "Description", "Priority", "Category", "Status"]);
    for step in steps {
        let status_cell = if step.completed {
            Cell::new("done").fg(Color::Green)
        } else {
            Cell::new("pending").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(step.id.to_string()).fg(Color::Yellow),
            Cell::new(truncate(&step.description, 55)).fg(Color::White),
            Cell::new(format!("P{}", step.priority)).fg(Color::White),
            Cell::new(&step.category).fg(Color::Cyan),
            status_cell,
        ]);
    }
    table
}

pub fn quota_table(records: &[QuotaRecord]) -> Table {
    let mut table = base_table(&["Model", "Requests", "Input chars", "Output chars"]);
    for record in records {
        table.add_row(vec![
            Cell::new(&record.model_name).fg(Color::Cyan),
            Cell::new(record.request_count.to_string()).fg(Color::White),
            Cell::new(record.input_chars_total.to_string()).fg(Color::DarkGrey),
            Cell::new(record.output_chars_total.to_string()).fg(Color::DarkGrey),
        ]);
    }
    table
}
