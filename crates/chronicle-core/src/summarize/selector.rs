//! Model selector: first catalog model with remaining daily quota.
//!
//! Two preference orders exist. Large transcripts benefit from fewer,
//! bigger calls, so they favor large-chunk models; everything else scans
//! the catalog in plain priority order. When every model is at its daily
//! cap the selector reports `QuotaExhausted` -- the run cannot proceed
//! today.

use chronicle_types::config::SummarizerConfig;
use chronicle_types::error::SummarizeError;
use chronicle_types::model::{ModelCatalog, ModelDescriptor};
use chrono::NaiveDate;

use crate::repository::QuotaLedger;

/// How demanding a transcript is, derived from its total line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Standard,
    Large,
}

impl Complexity {
    /// Large once a transcript passes the medium-band boundary -- the same
    /// point at which the planner raises the chunk size.
    pub fn of(total_lines: u32, config: &SummarizerConfig) -> Self {
        if total_lines > config.medium_transcript_lines {
            Complexity::Large
        } else {
            Complexity::Standard
        }
    }
}

/// Selects the best available model variant for one request.
pub struct ModelSelector<'a> {
    catalog: &'a ModelCatalog,
}

impl<'a> ModelSelector<'a> {
    pub fn new(catalog: &'a ModelCatalog) -> Self {
        Self { catalog }
    }

    /// Scan the active preference order and return the first model whose
    /// daily limit still has headroom on `date`.
    pub async fn select<L: QuotaLedger>(
        &self,
        ledger: &L,
        complexity: Complexity,
        date: NaiveDate,
    ) -> Result<&'a ModelDescriptor, SummarizeError> {
        let order = match complexity {
            Complexity::Large => self.catalog.large_chunk_order(),
            Complexity::Standard => self.catalog.default_order(),
        };

        for model in order {
            let used = ledger.get_usage(&model.name, date).await?;
            if used < model.daily_request_limit {
                tracing::debug!(
                    model = %model.name,
                    used,
                    limit = model.daily_request_limit,
                    "selected model"
                );
                return Ok(model);
            }
        }

        tracing::warn!(%date, "every catalog model is at its daily limit");
        Err(SummarizeError::QuotaExhausted { date })
    }
}
