//! Project milestone and next-step tracking types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Planned,
    InProgress,
    Completed,
    Archived,
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MilestoneStatus::Planned => write!(f, "planned"),
            MilestoneStatus::InProgress => write!(f, "in_progress"),
            MilestoneStatus::Completed => write!(f, "completed"),
            MilestoneStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for MilestoneStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planned" => Ok(MilestoneStatus::Planned),
            "in_progress" => Ok(MilestoneStatus::InProgress),
            "completed" => Ok(MilestoneStatus::Completed),
            "archived" => Ok(MilestoneStatus::Archived),
            other => Err(format!("invalid milestone status: '{other}'")),
        }
    }
}

/// What kind of work a milestone covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    Feature,
    Bugfix,
    Optimization,
    Docs,
}

impl fmt::Display for MilestoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MilestoneKind::Feature => write!(f, "feature"),
            MilestoneKind::Bugfix => write!(f, "bugfix"),
            MilestoneKind::Optimization => write!(f, "optimization"),
            MilestoneKind::Docs => write!(f, "docs"),
        }
    }
}

impl FromStr for MilestoneKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feature" => Ok(MilestoneKind::Feature),
            "bugfix" => Ok(MilestoneKind::Bugfix),
            "optimization" => Ok(MilestoneKind::Optimization),
            "docs" => Ok(MilestoneKind::Docs),
            other => Err(format!("invalid milestone kind: '{other}'")),
        }
    }
}

/// A tracked feature/bugfix milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub status: MilestoneStatus,
    pub kind: MilestoneKind,
    /// 1 (highest) to 5 (lowest).
    pub priority: u8,
    pub completed_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

impl Milestone {
    pub fn new(title: &str, kind: MilestoneKind, priority: u8) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            title: title.to_string(),
            description: None,
            status: MilestoneStatus::Planned,
            kind,
            priority: priority.clamp(1, 5),
            completed_at: None,
            tags: Vec::new(),
        }
    }
}

/// A pending TODO item, optionally linked to a milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextStep {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub description: String,
    /// 1 (highest) to 5 (lowest).
    pub priority: u8,
    pub category: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub milestone_id: Option<Uuid>,
}

impl NextStep {
    pub fn new(description: &str, priority: u8, category: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            description: description.to_string(),
            priority: priority.clamp(1, 5),
            category: category.to_string(),
            completed: false,
            completed_at: None,
            milestone_id: None,
        }
    }
}
