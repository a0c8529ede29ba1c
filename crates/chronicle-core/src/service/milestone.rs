//! Milestone and next-step CRUD service.

use chronicle_types::error::RepositoryError;
use chronicle_types::milestone::{Milestone, MilestoneKind, MilestoneStatus, NextStep};
use uuid::Uuid;

use crate::repository::{MilestoneRepository, NextStepRepository};

/// CRUD facade over milestone and next-step storage.
pub struct MilestoneService<M, N> {
    milestones: M,
    steps: N,
}

impl<M: MilestoneRepository, N: NextStepRepository> MilestoneService<M, N> {
    pub fn new(milestones: M, steps: N) -> Self {
        Self { milestones, steps }
    }

    pub async fn add_milestone(
        &self,
        title: &str,
        kind: MilestoneKind,
        priority: u8,
        description: Option<String>,
        tags: Vec<String>,
    ) -> Result<Milestone, RepositoryError> {
        let mut milestone = Milestone::new(title, kind, priority);
        milestone.description = description;
        milestone.tags = tags;
        self.milestones.create(&milestone).await?;
        tracing::info!(id = %milestone.id, title, "milestone created");
        Ok(milestone)
    }

    pub async fn list_milestones(
        &self,
        status: Option<MilestoneStatus>,
    ) -> Result<Vec<Milestone>, RepositoryError> {
        self.milestones.list(status).await
    }

    /// Move a milestone to a new status. Completion stamps `completed_at`
    /// at the repository layer.
    pub async fn set_milestone_status(
        &self,
        id: &Uuid,
        status: MilestoneStatus,
    ) -> Result<(), RepositoryError> {
        self.milestones.get(id).await?.ok_or(RepositoryError::NotFound)?;
        self.milestones.set_status(id, status).await
    }

    pub async fn add_step(
        &self,
        description: &str,
        priority: u8,
        category: &str,
        milestone_id: Option<Uuid>,
    ) -> Result<NextStep, RepositoryError> {
        let mut step = NextStep::new(description, priority, category);
        step.milestone_id = milestone_id;
        self.steps.create(&step).await?;
        Ok(step)
    }

    pub async fn list_steps(&self, include_completed: bool) -> Result<Vec<NextStep>, RepositoryError> {
        self.steps.list(include_completed).await
    }

    pub async fn complete_step(&self, id: &Uuid) -> Result<(), RepositoryError> {
        self.steps.complete(id).await
    }
}
