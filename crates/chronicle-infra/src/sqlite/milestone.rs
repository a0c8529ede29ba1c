//! SQLite milestone and next-step repository implementations.

use chronicle_core::repository::{MilestoneRepository, NextStepRepository};
use chronicle_types::error::RepositoryError;
use chronicle_types::milestone::{Milestone, MilestoneKind, MilestoneStatus, NextStep};
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `MilestoneRepository`.
pub struct SqliteMilestoneRepository {
    pool: DatabasePool,
}

impl SqliteMilestoneRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn milestone_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Milestone, RepositoryError> {
    let q = |e: sqlx::Error| RepositoryError::Query(e.to_string());

    let id: String = row.try_get("id").map_err(q)?;
    let created_at: String = row.try_get("created_at").map_err(q)?;
    let status: String = row.try_get("status").map_err(q)?;
    let kind: String = row.try_get("kind").map_err(q)?;
    let completed_at: Option<String> = row.try_get("completed_at").map_err(q)?;
    let tags: String = row.try_get("tags").map_err(q)?;
    let priority: i64 = row.try_get("priority").map_err(q)?;

    Ok(Milestone {
        id: Uuid::parse_str(&id)
            .map_err(|e| RepositoryError::Query(format!("invalid milestone id: {e}")))?,
        created_at: parse_datetime(&created_at)?,
        title: row.try_get("title").map_err(q)?,
        description: row.try_get("description").map_err(q)?,
        status: status
            .parse::<MilestoneStatus>()
            .map_err(RepositoryError::Query)?,
        kind: kind.parse::<MilestoneKind>().map_err(RepositoryError::Query)?,
        priority: priority as u8,
        completed_at: completed_at.as_deref().map(parse_datetime).transpose()?,
        tags: serde_json::from_str(&tags)
            .map_err(|e| RepositoryError::Query(format!("invalid tags: {e}")))?,
    })
}

impl MilestoneRepository for SqliteMilestoneRepository {
    async fn create(&self, milestone: &Milestone) -> Result<(), RepositoryError> {
        let tags = serde_json::to_string(&milestone.tags)
            .map_err(|e| RepositoryError::Query(format!("tags encode: {e}")))?;

        sqlx::query(
            r#"INSERT INTO milestones (id, created_at, title, description, status, kind, priority, completed_at, tags)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(milestone.id.to_string())
        .bind(format_datetime(&milestone.created_at))
        .bind(&milestone.title)
        .bind(&milestone.description)
        .bind(milestone.status.to_string())
        .bind(milestone.kind.to_string())
        .bind(milestone.priority as i64)
        .bind(milestone.completed_at.as_ref().map(format_datetime))
        .bind(tags)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Milestone>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM milestones WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(milestone_from_row).transpose()
    }

    async fn list(
        &self,
        status: Option<MilestoneStatus>,
    ) -> Result<Vec<Milestone>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query("SELECT * FROM milestones WHERE status = ? ORDER BY created_at DESC")
                    .bind(status.to_string())
                    .fetch_all(&self.pool.reader)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM milestones ORDER BY created_at DESC")
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(milestone_from_row).collect()
    }

    async fn set_status(&self, id: &Uuid, status: MilestoneStatus) -> Result<(), RepositoryError> {
        let completed_at = if status == MilestoneStatus::Completed {
            Some(format_datetime(&Utc::now()))
        } else {
            None
        };

        let result = sqlx::query("UPDATE milestones SET status = ?, completed_at = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(completed_at)
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// SQLite-backed implementation of `NextStepRepository`.
pub struct SqliteNextStepRepository {
    pool: DatabasePool,
}

impl SqliteNextStepRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn step_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<NextStep, RepositoryError> {
    let q = |e: sqlx::Error| RepositoryError::Query(e.to_string());

    let id: String = row.try_get("id").map_err(q)?;
    let created_at: String = row.try_get("created_at").map_err(q)?;
    let completed: i64 = row.try_get("completed").map_err(q)?;
    let completed_at: Option<String> = row.try_get("completed_at").map_err(q)?;
    let milestone_id: Option<String> = row.try_get("milestone_id").map_err(q)?;
    let priority: i64 = row.try_get("priority").map_err(q)?;

    Ok(NextStep {
        id: Uuid::parse_str(&id)
            .map_err(|e| RepositoryError::Query(format!("invalid step id: {e}")))?,
        created_at: parse_datetime(&created_at)?,
        description: row.try_get("description").map_err(q)?,
        priority: priority as u8,
        category: row.try_get("category").map_err(q)?,
        completed: completed != 0,
        completed_at: completed_at.as_deref().map(parse_datetime).transpose()?,
        milestone_id: milestone_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid milestone_id: {e}")))?,
    })
}

impl NextStepRepository for SqliteNextStepRepository {
    async fn create(&self, step: &NextStep) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO next_steps (id, created_at, description, priority, category, completed, completed_at, milestone_id)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(step.id.to_string())
        .bind(format_datetime(&step.created_at))
        .bind(&step.description)
        .bind(step.priority as i64)
        .bind(&step.category)
        .bind(step.completed as i64)
        .bind(step.completed_at.as_ref().map(format_datetime))
        .bind(step.milestone_id.map(|id| id.to_string()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list(&self, include_completed: bool) -> Result<Vec<NextStep>, RepositoryError> {
        let rows = if include_completed {
            sqlx::query("SELECT * FROM next_steps ORDER BY priority ASC, created_at ASC")
                .fetch_all(&self.pool.reader)
                .await
        } else {
            sqlx::query(
                "SELECT * FROM next_steps WHERE completed = 0 ORDER BY priority ASC, created_at ASC",
            )
            .fetch_all(&self.pool.reader)
            .await
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(step_from_row).collect()
    }

    async fn complete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE next_steps SET completed = 1, completed_at = ? WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
