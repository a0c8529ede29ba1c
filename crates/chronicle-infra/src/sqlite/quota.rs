//! SQLite quota ledger implementation.
//!
//! The increment is a single `INSERT .. ON CONFLICT .. DO UPDATE`, so
//! concurrent pipelines for independent sessions update the same
//! (model, day) row atomically.

use chronicle_core::repository::QuotaLedger;
use chronicle_types::error::RepositoryError;
use chronicle_types::quota::QuotaRecord;
use chrono::{NaiveDate, Utc};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed implementation of `QuotaLedger`.
pub struct SqliteQuotaLedger {
    pool: DatabasePool,
}

impl SqliteQuotaLedger {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(s: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| RepositoryError::Query(format!("invalid date: {e}")))
}

impl QuotaLedger for SqliteQuotaLedger {
    async fn get_usage(&self, model: &str, date: NaiveDate) -> Result<u32, RepositoryError> {
        let row = sqlx::query(
            "SELECT request_count FROM model_usage WHERE model_name = ? AND date = ?",
        )
        .bind(model)
        .bind(format_date(date))
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let count: i64 = row
                    .try_get("request_count")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(count as u32)
            }
            None => Ok(0),
        }
    }

    async fn increment_usage(
        &self,
        model: &str,
        date: NaiveDate,
        input_chars: u64,
        output_chars: u64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO model_usage
               (model_name, date, request_count, input_chars_total, output_chars_total, updated_at)
               VALUES (?, ?, 1, ?, ?, ?)
               ON CONFLICT(model_name, date) DO UPDATE SET
                   request_count = request_count + 1,
                   input_chars_total = input_chars_total + excluded.input_chars_total,
                   output_chars_total = output_chars_total + excluded.output_chars_total,
                   updated_at = excluded.updated_at"#,
        )
        .bind(model)
        .bind(format_date(date))
        .bind(input_chars as i64)
        .bind(output_chars as i64)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn usage_for_date(&self, date: NaiveDate) -> Result<Vec<QuotaRecord>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM model_usage WHERE date = ? ORDER BY model_name")
            .bind(format_date(date))
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let date_str: String = row
                    .try_get("date")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let updated_at: String = row
                    .try_get("updated_at")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let request_count: i64 = row
                    .try_get("request_count")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let input_chars: i64 = row
                    .try_get("input_chars_total")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let output_chars: i64 = row
                    .try_get("output_chars_total")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;

                Ok(QuotaRecord {
                    model_name: row
                        .try_get("model_name")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                    date: parse_date(&date_str)?,
                    request_count: request_count as u32,
                    input_chars_total: input_chars as u64,
                    output_chars_total: output_chars as u64,
                    updated_at: parse_datetime(&updated_at)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ledger() -> (tempfile::TempDir, SqliteQuotaLedger) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("quota.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let ledger = SqliteQuotaLedger::new(DatabasePool::new(&url).await.unwrap());
        (dir, ledger)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    #[tokio::test]
    async fn test_usage_defaults_to_zero() {
        let (_dir, ledger) = ledger().await;
        assert_eq!(ledger.get_usage("gemini-2.0-flash", day()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_increment_creates_then_updates() {
        let (_dir, ledger) = ledger().await;

        ledger.increment_usage("flash", day(), 1_000, 200).await.unwrap();
        ledger.increment_usage("flash", day(), 2_000, 300).await.unwrap();

        assert_eq!(ledger.get_usage("flash", day()).await.unwrap(), 2);

        let records = ledger.usage_for_date(day()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].request_count, 2);
        assert_eq!(records[0].input_chars_total, 3_000);
        assert_eq!(records[0].output_chars_total, 500);
    }

    #[tokio::test]
    async fn test_days_are_separate_rows() {
        let (_dir, ledger) = ledger().await;
        let tomorrow = day().succ_opt().unwrap();

        ledger.increment_usage("flash", day(), 10, 10).await.unwrap();
        ledger.increment_usage("flash", tomorrow, 10, 10).await.unwrap();

        assert_eq!(ledger.get_usage("flash", day()).await.unwrap(), 1);
        assert_eq!(ledger.get_usage("flash", tomorrow).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_models_are_separate_rows() {
        let (_dir, ledger) = ledger().await;

        ledger.increment_usage("flash", day(), 10, 10).await.unwrap();
        ledger.increment_usage("pro", day(), 10, 10).await.unwrap();

        let records = ledger.usage_for_date(day()).await.unwrap();
        assert_eq!(records.len(), 2);
    }
}
