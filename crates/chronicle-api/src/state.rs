//! Shared application state: config, database pool, and service factories.

use std::path::PathBuf;

use anyhow::{Context, Result};

use chronicle_core::service::{ActivityService, MilestoneService};
use chronicle_core::summarize::SummaryOrchestrator;
use chronicle_infra::config::{data_dir, ConfigStore};
use chronicle_infra::provider::ProviderBackend;
use chronicle_infra::sqlite::{
    default_database_url, DatabasePool, SqliteCheckpointRepository, SqliteCommitRepository,
    SqliteMilestoneRepository, SqliteNextStepRepository, SqliteQuotaLedger,
    SqliteSessionRepository,
};
use chronicle_types::config::GlobalConfig;

/// Everything a command handler needs, initialized once at startup.
pub struct AppState {
    pub config: GlobalConfig,
    pub config_store: ConfigStore,
    pub pool: DatabasePool,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load config and open the database, creating both on first run.
    pub async fn init() -> Result<Self> {
        let data_dir = data_dir();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("could not create {}", data_dir.display()))?;

        let config_store = ConfigStore::open_default();
        let config = config_store.load().context("could not load config")?;

        let pool = DatabasePool::new(&default_database_url())
            .await
            .context("could not open database")?;

        Ok(Self {
            config,
            config_store,
            pool,
            data_dir,
        })
    }

    // -----------------------------------------------------------------------
    // Repository factories (each holds a cheap pool clone)
    // -----------------------------------------------------------------------

    pub fn sessions(&self) -> SqliteSessionRepository {
        SqliteSessionRepository::new(self.pool.clone())
    }

    pub fn commits(&self) -> SqliteCommitRepository {
        SqliteCommitRepository::new(self.pool.clone())
    }

    pub fn checkpoints(&self) -> SqliteCheckpointRepository {
        SqliteCheckpointRepository::new(self.pool.clone())
    }

    pub fn ledger(&self) -> SqliteQuotaLedger {
        SqliteQuotaLedger::new(self.pool.clone())
    }

    // -----------------------------------------------------------------------
    // Services
    // -----------------------------------------------------------------------

    pub fn activity(&self) -> ActivityService<SqliteCommitRepository, SqliteSessionRepository> {
        ActivityService::new(self.commits(), self.sessions())
    }

    pub fn milestones(
        &self,
    ) -> MilestoneService<SqliteMilestoneRepository, SqliteNextStepRepository> {
        MilestoneService::new(
            SqliteMilestoneRepository::new(self.pool.clone()),
            SqliteNextStepRepository::new(self.pool.clone()),
        )
    }

    pub fn provider(&self) -> Result<ProviderBackend> {
        ProviderBackend::from_config(&self.config).map_err(Into::into)
    }

    /// The summarization engine wired to SQLite storage and the configured
    /// provider.
    pub fn orchestrator(
        &self,
    ) -> Result<
        SummaryOrchestrator<
            SqliteSessionRepository,
            SqliteCheckpointRepository,
            SqliteQuotaLedger,
            ProviderBackend,
        >,
    > {
        Ok(SummaryOrchestrator::new(
            self.sessions(),
            self.checkpoints(),
            self.ledger(),
            self.provider()?,
            self.config.summarizer.clone(),
            self.config.models.clone(),
        ))
    }

    /// Directory where raw recording transcripts are written.
    pub fn recordings_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }
}
