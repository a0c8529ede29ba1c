//! Daily digest: one short narrative for a day of commits and sessions.
//!
//! Unlike the chunked session engine this is a single provider call over
//! already-small inputs, but it draws from the same model catalog and
//! counts against the same quota ledger.

use chrono::NaiveDate;

use chronicle_types::error::SummarizeError;
use chronicle_types::model::ModelCatalog;
use chronicle_types::summary::DailySummary;

use crate::provider::GenerationProvider;
use crate::repository::QuotaLedger;
use crate::summarize::selector::{Complexity, ModelSelector};

/// Build the digest prompt from the day's commit subjects and session labels.
fn digest_prompt(commits: &[String], sessions: &[String]) -> String {
    let mut context = String::from("Daily development activity:\n\n");

    if !commits.is_empty() {
        context.push_str("Git commits:\n");
        for commit in commits {
            context.push_str(&format!("- {commit}\n"));
        }
        context.push('\n');
    }

    if !sessions.is_empty() {
        context.push_str("AI-tool sessions:\n");
        for session in sessions {
            context.push_str(&format!("- {session}\n"));
        }
    }

    format!(
        "Summarize this day of development activity in 200 words or less.\n\
         Focus on the main features or bugs worked on, important decisions, \
         and overall progress.\n\n{context}\nSummary:"
    )
}

/// Generate a daily summary for `date` from the given activity lines.
pub async fn daily_digest<Q, P>(
    ledger: &Q,
    provider: &P,
    catalog: &ModelCatalog,
    date: NaiveDate,
    commits: Vec<String>,
    sessions: Vec<String>,
) -> Result<DailySummary, SummarizeError>
where
    Q: QuotaLedger,
    P: GenerationProvider,
{
    let commits_count = commits.len() as u32;
    let sessions_count = sessions.len() as u32;

    let selector = ModelSelector::new(catalog);
    let model = selector.select(ledger, Complexity::Standard, date).await?;

    let prompt = digest_prompt(&commits, &sessions);
    let summary = provider.generate(&prompt, &model.name).await?;
    ledger
        .increment_usage(&model.name, date, prompt.len() as u64, summary.len() as u64)
        .await?;

    Ok(DailySummary {
        date,
        summary: summary.trim().to_string(),
        commits_count,
        sessions_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_prompt_lists_both_sources() {
        let prompt = digest_prompt(
            &["Add quota ledger".to_string()],
            &["Interactive claude session".to_string()],
        );
        assert!(prompt.contains("Git commits:\n- Add quota ledger"));
        assert!(prompt.contains("AI-tool sessions:\n- Interactive claude session"));
        assert!(prompt.contains("200 words"));
    }

    #[test]
    fn test_digest_prompt_skips_empty_sections() {
        let prompt = digest_prompt(&[], &["session".to_string()]);
        assert!(!prompt.contains("Git commits"));
        assert!(prompt.contains("AI-tool sessions"));
    }
}
