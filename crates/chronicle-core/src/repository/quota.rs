//! QuotaLedger trait definition.
//!
//! Per-model, per-calendar-day request and character counters. The
//! increment must be atomic per (model, date) key at the storage layer so
//! independent session pipelines can run concurrently.

use chronicle_types::error::RepositoryError;
use chronicle_types::quota::QuotaRecord;
use chrono::NaiveDate;

/// Repository trait for daily model usage counters.
///
/// Implementations live in chronicle-infra (e.g., `SqliteQuotaLedger`).
pub trait QuotaLedger: Send + Sync {
    /// Requests already counted against a model on a date. 0 if no row exists.
    fn get_usage(
        &self,
        model: &str,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<u32, RepositoryError>> + Send;

    /// Count one request plus its character volumes against a model/day.
    ///
    /// Creates the day's row on first use, increments it atomically
    /// thereafter. Counts never decrease within a day; a new day gets a
    /// fresh row rather than resetting an old one.
    fn increment_usage(
        &self,
        model: &str,
        date: NaiveDate,
        input_chars: u64,
        output_chars: u64,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Every model's counters for a date, for the status dashboard.
    fn usage_for_date(
        &self,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<QuotaRecord>, RepositoryError>> + Send;
}
