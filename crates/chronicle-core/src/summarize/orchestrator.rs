//! Summarization orchestrator.
//!
//! Drives one session through PLANNING -> PROCESSING_CHUNK(i) ->
//! COMPLETE | FAILED. Every successful chunk is checkpointed before the
//! run advances, so the process may be interrupted at any point and a
//! later run resumes from the first missing chunk with no recomputation.
//! A session whose checkpoints already cover the whole plan returns its
//! stored summary without a single provider call.

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use chronicle_types::config::SummarizerConfig;
use chronicle_types::error::SummarizeError;
use chronicle_types::model::ModelCatalog;
use chronicle_types::summary::ChunkCheckpoint;

use crate::provider::GenerationProvider;
use crate::repository::{CheckpointRepository, QuotaLedger, SessionRepository};

use super::compositor::SummaryCompositor;
use super::executor::{ExecutionError, RequestExecutor, RetryPolicy};
use super::governor::{estimate_tokens, RateGovernor};
use super::planner::{self, LineRange};
use super::selector::{Complexity, ModelSelector};

/// Transcripts shorter than this are not worth a provider call.
const MIN_TRANSCRIPT_CHARS: usize = 50;

const TOO_SHORT_SUMMARY: &str = "Session too short to summarize.";

/// Sequences the summarization pipeline for one session at a time.
///
/// Generic over the repositories and the provider so any persistence layer
/// or backend fits. One orchestrator may summarize many sessions, but the
/// checkpoint upsert assumes at most one writer per session at a time.
pub struct SummaryOrchestrator<S, C, Q, P> {
    sessions: S,
    checkpoints: C,
    ledger: Q,
    provider: P,
    config: SummarizerConfig,
    catalog: ModelCatalog,
}

impl<S, C, Q, P> SummaryOrchestrator<S, C, Q, P>
where
    S: SessionRepository,
    C: CheckpointRepository,
    Q: QuotaLedger,
    P: GenerationProvider,
{
    pub fn new(
        sessions: S,
        checkpoints: C,
        ledger: Q,
        provider: P,
        config: SummarizerConfig,
        catalog: ModelCatalog,
    ) -> Self {
        Self {
            sessions,
            checkpoints,
            ledger,
            provider,
            config,
            catalog,
        }
    }

    /// Summarize a session, resuming from checkpoints when present.
    ///
    /// Returns the final cumulative summary. On chunk failure all committed
    /// chunks stay persisted and the error carries the truncation-annotated
    /// partial summary.
    #[tracing::instrument(name = "summarize_session", skip(self), fields(session_id = %session_id))]
    pub async fn summarize(&self, session_id: Uuid) -> Result<String, SummarizeError> {
        let session = self
            .sessions
            .get(&session_id)
            .await?
            .ok_or(SummarizeError::SessionNotFound(session_id))?;

        let transcript = session
            .transcript
            .as_deref()
            .ok_or(SummarizeError::MissingTranscript(session_id))?;

        if transcript.trim().len() < MIN_TRANSCRIPT_CHARS {
            self.sessions
                .save_final_summary(&session_id, TOO_SHORT_SUMMARY)
                .await?;
            return Ok(TOO_SHORT_SUMMARY.to_string());
        }

        let lines: Vec<&str> = transcript.lines().collect();
        let total_lines = lines.len() as u32;

        // PLANNING: boundaries are a pure function of the line count, so a
        // resumed run recomputes the identical partition.
        let chunk_lines = planner::chunk_size_hint(
            total_lines,
            &self.config,
            self.catalog.has_large_chunk_model(),
        );
        let plan = planner::plan(total_lines, chunk_lines);
        let num_chunks = plan.len() as u32;

        let existing = self.checkpoints.load_chunks(&session_id).await?;
        let present: BTreeSet<u32> = existing.iter().map(|c| c.chunk_number).collect();
        let missing: Vec<u32> = (1..=num_chunks).filter(|n| !present.contains(n)).collect();

        // Already complete: idempotent short-circuit, zero provider calls.
        if missing.is_empty() {
            let last = existing
                .iter()
                .max_by_key(|c| c.chunk_number)
                .map(|c| c.cumulative_summary.clone())
                .unwrap_or_default();
            if !session.summarized {
                // A prior run was interrupted between the last checkpoint
                // and the final write; finish that step now.
                self.sessions.save_final_summary(&session_id, &last).await?;
            }
            tracing::info!(num_chunks, "session already summarized, returning stored summary");
            return Ok(last);
        }

        let resume_at = missing[0];
        let mut cumulative = if resume_at == 1 {
            String::new()
        } else {
            existing
                .iter()
                .find(|c| c.chunk_number == resume_at - 1)
                .map(|c| c.cumulative_summary.clone())
                .unwrap_or_default()
        };

        tracing::info!(
            total_lines,
            chunk_lines,
            num_chunks,
            resume_at,
            "starting summarization run"
        );

        let complexity = Complexity::of(total_lines, &self.config);
        let selector = ModelSelector::new(&self.catalog);
        let policy = RetryPolicy {
            max_attempts: self.config.max_retries,
            ..RetryPolicy::default()
        };
        let executor = RequestExecutor::new(
            &self.provider,
            policy,
            std::time::Duration::from_secs(self.config.request_timeout_secs),
        );
        // Window state is owned by this run; capacity follows the selected model.
        let mut governor = RateGovernor::new(0);

        for chunk_number in resume_at..=num_chunks {
            let range = plan[(chunk_number - 1) as usize];
            let chunk_text = slice_lines(&lines, range);

            let date = Utc::now().date_naive();
            let model = selector.select(&self.ledger, complexity, date).await?;

            let prompt = if chunk_number == 1 {
                SummaryCompositor::initial_prompt(&chunk_text)
            } else {
                SummaryCompositor::integration_prompt(&cumulative, &chunk_text)
            };

            governor.set_capacity(model.tokens_per_minute);
            let estimated = estimate_tokens(prompt.len());
            let delay = governor.required_delay(Instant::now(), estimated);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::debug!(
                chunk_number,
                start_line = range.start,
                end_line = range.end,
                model = %model.name,
                "processing chunk"
            );

            let response = match executor.execute(&prompt, &model.name).await {
                Ok(text) => text,
                Err(ExecutionError::RetryExhausted { attempts, last }) => {
                    // Fatal for this chunk only: committed chunks stay put
                    // and the caller gets an annotated partial summary.
                    let partial = SummaryCompositor::annotate_truncated(
                        &cumulative,
                        chunk_number - 1,
                        num_chunks,
                    );
                    tracing::error!(
                        chunk_number,
                        attempts,
                        error = %last,
                        "abandoning run, prior chunks preserved"
                    );
                    return Err(SummarizeError::ChunkRetryExhausted {
                        chunk_number,
                        completed_chunks: chunk_number - 1,
                        partial_summary: partial,
                        source: last,
                    });
                }
                Err(ExecutionError::Fatal(err)) => return Err(SummarizeError::Provider(err)),
            };

            governor.record(Instant::now(), estimated + estimate_tokens(response.len()));

            // The response IS the new cumulative summary: full replacement,
            // never concatenation.
            cumulative = response.trim().to_string();

            let checkpoint = ChunkCheckpoint {
                session_id,
                chunk_number,
                start_line: range.start,
                end_line: range.end,
                chunk_summary: cumulative.clone(),
                cumulative_summary: cumulative.clone(),
                written_at: Utc::now(),
            };
            self.checkpoints.save_chunk(&checkpoint).await?;

            self.ledger
                .increment_usage(&model.name, date, prompt.len() as u64, cumulative.len() as u64)
                .await?;
        }

        // COMPLETE: one-way transition through the session interface.
        self.sessions
            .save_final_summary(&session_id, &cumulative)
            .await?;
        tracing::info!(num_chunks, "summarization complete");

        Ok(cumulative)
    }

    /// Forced re-run: clear every checkpoint for the session and summarize
    /// it again from chunk 1.
    #[tracing::instrument(name = "resummarize_session", skip(self), fields(session_id = %session_id))]
    pub async fn resummarize(&self, session_id: Uuid) -> Result<String, SummarizeError> {
        self.checkpoints.clear_chunks(&session_id).await?;
        self.summarize(session_id).await
    }
}

/// Join the lines of one half-open range back into chunk text.
fn slice_lines(lines: &[&str], range: LineRange) -> String {
    lines[range.start as usize..range.end as usize].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_types::error::{ProviderError, RepositoryError};
    use chronicle_types::model::{ModelDescriptor, PreferredUse};
    use chronicle_types::quota::QuotaRecord;
    use chronicle_types::session::AiSession;
    use chrono::{DateTime, NaiveDate};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    // -------------------------------------------------------------------
    // In-memory test doubles
    // -------------------------------------------------------------------

    #[derive(Default)]
    struct MemSessions {
        sessions: Mutex<HashMap<Uuid, AiSession>>,
    }

    impl MemSessions {
        fn with_transcript(transcript: &str) -> (Self, Uuid) {
            let mut session = AiSession::started("claude", None, None);
            session.transcript = Some(transcript.to_string());
            let id = session.id;
            let repo = Self::default();
            repo.sessions.lock().unwrap().insert(id, session);
            (repo, id)
        }

        fn summary_of(&self, id: &Uuid) -> Option<String> {
            self.sessions.lock().unwrap().get(id).and_then(|s| s.summary.clone())
        }

        fn is_summarized(&self, id: &Uuid) -> bool {
            self.sessions
                .lock()
                .unwrap()
                .get(id)
                .map(|s| s.summarized)
                .unwrap_or(false)
        }
    }

    impl SessionRepository for MemSessions {
        async fn create(&self, session: &AiSession) -> Result<(), RepositoryError> {
            self.sessions.lock().unwrap().insert(session.id, session.clone());
            Ok(())
        }

        async fn get(&self, session_id: &Uuid) -> Result<Option<AiSession>, RepositoryError> {
            Ok(self.sessions.lock().unwrap().get(session_id).cloned())
        }

        async fn finalize_recording(
            &self,
            session_id: &Uuid,
            transcript: &str,
            duration_ms: u64,
            label: &str,
        ) -> Result<(), RepositoryError> {
            let mut sessions = self.sessions.lock().unwrap();
            let session = sessions.get_mut(session_id).ok_or(RepositoryError::NotFound)?;
            session.transcript = Some(transcript.to_string());
            session.duration_ms = Some(duration_ms);
            session.label = label.to_string();
            Ok(())
        }

        async fn save_final_summary(
            &self,
            session_id: &Uuid,
            summary: &str,
        ) -> Result<(), RepositoryError> {
            let mut sessions = self.sessions.lock().unwrap();
            let session = sessions.get_mut(session_id).ok_or(RepositoryError::NotFound)?;
            session.summary = Some(summary.to_string());
            session.summarized = true;
            Ok(())
        }

        async fn link_commit(&self, _: &Uuid, _: i64) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn list_recent(&self, _: i64) -> Result<Vec<AiSession>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn list_by_date_range(
            &self,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
            _: Option<&str>,
        ) -> Result<Vec<AiSession>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn search(&self, _: &str, _: i64) -> Result<Vec<AiSession>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct MemCheckpoints {
        chunks: Mutex<HashMap<(Uuid, u32), ChunkCheckpoint>>,
    }

    impl MemCheckpoints {
        fn seed(&self, session_id: Uuid, chunk_number: u32, cumulative: &str) {
            let checkpoint = ChunkCheckpoint {
                session_id,
                chunk_number,
                start_line: (chunk_number - 1) * 3_000,
                end_line: chunk_number * 3_000,
                chunk_summary: format!("chunk {chunk_number}"),
                cumulative_summary: cumulative.to_string(),
                written_at: Utc::now(),
            };
            self.chunks
                .lock()
                .unwrap()
                .insert((session_id, chunk_number), checkpoint);
        }

        fn numbers(&self, session_id: &Uuid) -> Vec<u32> {
            let mut numbers: Vec<u32> = self
                .chunks
                .lock()
                .unwrap()
                .keys()
                .filter(|(sid, _)| sid == session_id)
                .map(|(_, n)| *n)
                .collect();
            numbers.sort_unstable();
            numbers
        }

        fn cumulative_of(&self, session_id: &Uuid, chunk_number: u32) -> Option<String> {
            self.chunks
                .lock()
                .unwrap()
                .get(&(*session_id, chunk_number))
                .map(|c| c.cumulative_summary.clone())
        }
    }

    impl CheckpointRepository for MemCheckpoints {
        async fn save_chunk(&self, checkpoint: &ChunkCheckpoint) -> Result<(), RepositoryError> {
            self.chunks
                .lock()
                .unwrap()
                .insert((checkpoint.session_id, checkpoint.chunk_number), checkpoint.clone());
            Ok(())
        }

        async fn load_chunks(
            &self,
            session_id: &Uuid,
        ) -> Result<Vec<ChunkCheckpoint>, RepositoryError> {
            let mut chunks: Vec<ChunkCheckpoint> = self
                .chunks
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.session_id == *session_id)
                .cloned()
                .collect();
            chunks.sort_by_key(|c| c.chunk_number);
            Ok(chunks)
        }

        async fn clear_chunks(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
            self.chunks
                .lock()
                .unwrap()
                .retain(|(sid, _), _| sid != session_id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemLedger {
        counts: Mutex<HashMap<(String, NaiveDate), u32>>,
    }

    impl MemLedger {
        fn preload(&self, model: &str, date: NaiveDate, count: u32) {
            self.counts.lock().unwrap().insert((model.to_string(), date), count);
        }

        fn count(&self, model: &str, date: NaiveDate) -> u32 {
            *self
                .counts
                .lock()
                .unwrap()
                .get(&(model.to_string(), date))
                .unwrap_or(&0)
        }
    }

    impl QuotaLedger for MemLedger {
        async fn get_usage(&self, model: &str, date: NaiveDate) -> Result<u32, RepositoryError> {
            Ok(self.count(model, date))
        }

        async fn increment_usage(
            &self,
            model: &str,
            date: NaiveDate,
            _input_chars: u64,
            _output_chars: u64,
        ) -> Result<(), RepositoryError> {
            *self
                .counts
                .lock()
                .unwrap()
                .entry((model.to_string(), date))
                .or_insert(0) += 1;
            Ok(())
        }

        async fn usage_for_date(&self, _: NaiveDate) -> Result<Vec<QuotaRecord>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    /// Provider that numbers its responses and counts calls.
    struct CountingProvider {
        calls: AtomicU32,
        fail_always: bool,
    }

    impl CountingProvider {
        fn ok() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_always: false,
            }
        }

        fn always_failing() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_always: true,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GenerationProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(&self, _prompt: &str, _model: &str) -> Result<String, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_always {
                Err(ProviderError::Transient("503".to_string()))
            } else {
                Ok(format!("summary after call {n}"))
            }
        }
    }

    // -------------------------------------------------------------------
    // Fixtures
    // -------------------------------------------------------------------

    fn transcript_of_lines(n: u32) -> String {
        (0..n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    fn small_catalog() -> ModelCatalog {
        ModelCatalog::new(vec![ModelDescriptor {
            name: "flash".to_string(),
            daily_request_limit: 1_000,
            priority: 1,
            tokens_per_minute: 1_000_000,
            preferred_use: PreferredUse::Default,
        }])
    }

    fn orchestrator(
        sessions: MemSessions,
        checkpoints: MemCheckpoints,
        ledger: MemLedger,
        provider: CountingProvider,
    ) -> SummaryOrchestrator<MemSessions, MemCheckpoints, MemLedger, CountingProvider> {
        SummaryOrchestrator::new(
            sessions,
            checkpoints,
            ledger,
            provider,
            SummarizerConfig::default(),
            small_catalog(),
        )
    }

    // -------------------------------------------------------------------
    // End-to-end
    // -------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_twelve_thousand_lines_yield_four_chunks() {
        let (sessions, id) = MemSessions::with_transcript(&transcript_of_lines(12_000));
        let orch = orchestrator(sessions, MemCheckpoints::default(), MemLedger::default(), CountingProvider::ok());

        let summary = orch.summarize(id).await.unwrap();

        assert_eq!(orch.provider.calls(), 4);
        assert_eq!(orch.checkpoints.numbers(&id), vec![1, 2, 3, 4]);
        // Final summary equals chunk 4's cumulative summary.
        assert_eq!(summary, orch.checkpoints.cumulative_of(&id, 4).unwrap());
        assert_eq!(orch.sessions.summary_of(&id), Some(summary.clone()));
        assert!(orch.sessions.is_summarized(&id));
        // One quota increment per chunk.
        assert_eq!(orch.ledger.count("flash", Utc::now().date_naive()), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_session_short_circuits_without_provider_calls() {
        let (sessions, id) = MemSessions::with_transcript(&transcript_of_lines(12_000));
        let orch = orchestrator(sessions, MemCheckpoints::default(), MemLedger::default(), CountingProvider::ok());

        let first = orch.summarize(id).await.unwrap();
        let calls_after_first = orch.provider.calls();

        let second = orch.summarize(id).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(orch.provider.calls(), calls_after_first, "no new provider calls");
    }

    #[tokio::test(start_paused = true)]
    async fn test_gap_resume_starts_at_first_missing_chunk() {
        let (sessions, id) = MemSessions::with_transcript(&transcript_of_lines(15_000));
        let checkpoints = MemCheckpoints::default();
        checkpoints.seed(id, 1, "after one");
        checkpoints.seed(id, 2, "after two");
        checkpoints.seed(id, 3, "after three");

        let orch = orchestrator(sessions, checkpoints, MemLedger::default(), CountingProvider::ok());
        let summary = orch.summarize(id).await.unwrap();

        // 15,000 lines / 3,000 = 5 chunks; only 4 and 5 run.
        assert_eq!(orch.provider.calls(), 2);
        assert_eq!(orch.checkpoints.numbers(&id), vec![1, 2, 3, 4, 5]);
        // Chunks 1-3 were not recomputed.
        assert_eq!(orch.checkpoints.cumulative_of(&id, 3).unwrap(), "after three");
        assert_eq!(summary, orch.checkpoints.cumulative_of(&id, 5).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_seeds_from_preceding_cumulative() {
        let (sessions, id) = MemSessions::with_transcript(&transcript_of_lines(6_000));
        let checkpoints = MemCheckpoints::default();
        checkpoints.seed(id, 1, "the seed narrative");

        struct PromptCapture {
            prompts: Mutex<Vec<String>>,
        }

        impl GenerationProvider for PromptCapture {
            fn name(&self) -> &str {
                "capture"
            }

            async fn generate(&self, prompt: &str, _model: &str) -> Result<String, ProviderError> {
                self.prompts.lock().unwrap().push(prompt.to_string());
                Ok("updated".to_string())
            }
        }

        let provider = PromptCapture {
            prompts: Mutex::new(Vec::new()),
        };
        let orch = SummaryOrchestrator::new(
            sessions,
            checkpoints,
            MemLedger::default(),
            provider,
            SummarizerConfig::default(),
            small_catalog(),
        );

        orch.summarize(id).await.unwrap();

        let prompts = orch.provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1, "only chunk 2 runs");
        assert!(prompts[0].contains("the seed narrative"), "seeded from chunk 1's cumulative");
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_exhausted_before_any_provider_call() {
        let (sessions, id) = MemSessions::with_transcript(&transcript_of_lines(4_000));
        let ledger = MemLedger::default();
        ledger.preload("flash", Utc::now().date_naive(), 1_000);

        let orch = orchestrator(sessions, MemCheckpoints::default(), ledger, CountingProvider::ok());
        let err = orch.summarize(id).await.unwrap_err();

        assert!(matches!(err, SummarizeError::QuotaExhausted { .. }));
        assert_eq!(orch.provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion_preserves_prior_chunks() {
        let (sessions, id) = MemSessions::with_transcript(&transcript_of_lines(9_000));
        let checkpoints = MemCheckpoints::default();
        checkpoints.seed(id, 1, "first chunk done");
        checkpoints.seed(id, 2, "second chunk done");

        let orch = orchestrator(sessions, checkpoints, MemLedger::default(), CountingProvider::always_failing());
        let err = orch.summarize(id).await.unwrap_err();

        match err {
            SummarizeError::ChunkRetryExhausted {
                chunk_number,
                completed_chunks,
                partial_summary,
                ..
            } => {
                assert_eq!(chunk_number, 3);
                assert_eq!(completed_chunks, 2);
                assert!(partial_summary.starts_with("second chunk done"));
                assert!(partial_summary.contains("[summary truncated: 2 of 3 chunks processed]"));
            }
            other => panic!("expected ChunkRetryExhausted, got {other:?}"),
        }

        // Committed chunks are never discarded.
        assert_eq!(orch.checkpoints.numbers(&id), vec![1, 2]);
        assert!(!orch.sessions.is_summarized(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_transcript_is_fatal_before_provider() {
        let sessions = MemSessions::default();
        let session = AiSession::started("claude", None, None);
        let id = session.id;
        sessions.create(&session).await.unwrap();

        let orch = orchestrator(sessions, MemCheckpoints::default(), MemLedger::default(), CountingProvider::ok());
        let err = orch.summarize(id).await.unwrap_err();
        assert!(matches!(err, SummarizeError::MissingTranscript(_)));
        assert_eq!(orch.provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_session_is_fatal() {
        let orch = orchestrator(
            MemSessions::default(),
            MemCheckpoints::default(),
            MemLedger::default(),
            CountingProvider::ok(),
        );
        let err = orch.summarize(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, SummarizeError::SessionNotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_transcript_skips_provider() {
        let (sessions, id) = MemSessions::with_transcript("just a prompt");
        let orch = orchestrator(sessions, MemCheckpoints::default(), MemLedger::default(), CountingProvider::ok());

        let summary = orch.summarize(id).await.unwrap();
        assert_eq!(summary, TOO_SHORT_SUMMARY);
        assert_eq!(orch.provider.calls(), 0);
        assert!(orch.sessions.is_summarized(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resummarize_clears_and_redoes() {
        let (sessions, id) = MemSessions::with_transcript(&transcript_of_lines(6_000));
        let orch = orchestrator(sessions, MemCheckpoints::default(), MemLedger::default(), CountingProvider::ok());

        orch.summarize(id).await.unwrap();
        assert_eq!(orch.provider.calls(), 2);

        let summary = orch.resummarize(id).await.unwrap();
        // Both chunks ran again.
        assert_eq!(orch.provider.calls(), 4);
        assert_eq!(summary, orch.checkpoints.cumulative_of(&id, 2).unwrap());
    }
}
