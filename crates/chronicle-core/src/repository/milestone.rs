//! Milestone and next-step repository trait definitions.

use chronicle_types::error::RepositoryError;
use chronicle_types::milestone::{Milestone, MilestoneStatus, NextStep};
use uuid::Uuid;

/// Repository trait for project milestones.
pub trait MilestoneRepository: Send + Sync {
    fn create(
        &self,
        milestone: &Milestone,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Milestone>, RepositoryError>> + Send;

    /// Milestones, newest first, optionally filtered by status.
    fn list(
        &self,
        status: Option<MilestoneStatus>,
    ) -> impl std::future::Future<Output = Result<Vec<Milestone>, RepositoryError>> + Send;

    /// Update status (and completed_at when moving to Completed).
    fn set_status(
        &self,
        id: &Uuid,
        status: MilestoneStatus,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Repository trait for next-step TODO items.
pub trait NextStepRepository: Send + Sync {
    fn create(
        &self,
        step: &NextStep,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Steps ordered by priority then age. `include_completed` widens the
    /// listing past pending items.
    fn list(
        &self,
        include_completed: bool,
    ) -> impl std::future::Future<Output = Result<Vec<NextStep>, RepositoryError>> + Send;

    /// Mark a step completed.
    fn complete(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
