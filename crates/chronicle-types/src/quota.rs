//! Per-model, per-day usage counters.
//!
//! One row exists per (model, calendar day). Counts only grow within a
//! day; a new day starts a fresh row rather than resetting an old one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Daily usage counters for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaRecord {
    pub model_name: String,
    pub date: NaiveDate,
    pub request_count: u32,
    pub input_chars_total: u64,
    pub output_chars_total: u64,
    pub updated_at: DateTime<Utc>,
}

impl QuotaRecord {
    /// Fresh zeroed record for a model/day, before any request lands.
    pub fn empty(model_name: &str, date: NaiveDate) -> Self {
        Self {
            model_name: model_name.to_string(),
            date,
            request_count: 0,
            input_chars_total: 0,
            output_chars_total: 0,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_is_zeroed() {
        let record = QuotaRecord::empty("gemini-2.0-flash", NaiveDate::from_ymd_opt(2026, 8, 7).unwrap());
        assert_eq!(record.request_count, 0);
        assert_eq!(record.input_chars_total, 0);
        assert_eq!(record.output_chars_total, 0);
    }
}
