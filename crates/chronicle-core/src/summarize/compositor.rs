//! Rolling summary compositor.
//!
//! Chunk 1 asks the provider for a self-contained narrative of the first
//! chunk's text. Every later chunk hands back the current cumulative
//! summary (framed as "previous summary") together with the new chunk's
//! text (framed as "new activity") and instructs the provider to integrate
//! rather than append. The full response replaces the prior cumulative
//! summary, which bounds summarized context for sessions of unbounded
//! length.

/// Instructions shared by both prompt shapes.
const ANALYSIS_INSTRUCTIONS: &str = r#"REQUIREMENTS:
- Focus on WHAT was built or fixed, not how the conversation went
- Extract key technical decisions and their rationale
- Name specific files, functions, or components
- Note blockers, bugs, or issues encountered
- Use bullet points under these headings:

## What Was Built
## Key Decisions
## Files/Components Modified
## Issues/Blockers (if any)"#;

/// Builds the prompts for the incremental summarization calls.
pub struct SummaryCompositor;

impl SummaryCompositor {
    /// Prompt for the first chunk: a self-contained narrative summary.
    pub fn initial_prompt(chunk_text: &str) -> String {
        format!(
            "You are analyzing a terminal transcript of an AI-assisted development session.\n\
             Summarize the following transcript segment.\n\n\
             {ANALYSIS_INSTRUCTIONS}\n\n\
             TRANSCRIPT:\n{chunk_text}\n\nSUMMARY:"
        )
    }

    /// Prompt for chunk k>1: integrate new activity into the running summary.
    ///
    /// The response replaces the previous summary entirely -- the provider
    /// is told to produce one merged narrative, not an addendum.
    pub fn integration_prompt(previous_summary: &str, chunk_text: &str) -> String {
        format!(
            "You are analyzing a terminal transcript of an AI-assisted development session, \
             one segment at a time.\n\
             Below is the summary of everything so far, followed by the next segment.\n\
             Produce ONE updated summary that integrates the new activity into the \
             existing narrative. Do not append a separate section; rewrite the summary \
             so it reads as a single coherent account.\n\n\
             {ANALYSIS_INSTRUCTIONS}\n\n\
             PREVIOUS SUMMARY:\n{previous_summary}\n\n\
             NEW ACTIVITY:\n{chunk_text}\n\nUPDATED SUMMARY:"
        )
    }

    /// Marker appended to the last cumulative summary when a chunk
    /// exhausts its retries.
    pub fn truncation_marker(completed_chunks: u32, planned_chunks: u32) -> String {
        format!("[summary truncated: {completed_chunks} of {planned_chunks} chunks processed]")
    }

    /// Annotate a partial summary with the truncation marker.
    pub fn annotate_truncated(summary: &str, completed_chunks: u32, planned_chunks: u32) -> String {
        let marker = Self::truncation_marker(completed_chunks, planned_chunks);
        if summary.is_empty() {
            marker
        } else {
            format!("{summary}\n\n{marker}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_prompt_contains_chunk_text() {
        let prompt = SummaryCompositor::initial_prompt("$ cargo build\nFinished dev profile");
        assert!(prompt.contains("cargo build"));
        assert!(prompt.contains("What Was Built"));
        assert!(!prompt.contains("PREVIOUS SUMMARY"));
    }

    #[test]
    fn test_integration_prompt_frames_both_parts() {
        let prompt =
            SummaryCompositor::integration_prompt("Built the parser.", "$ cargo test\nok");
        assert!(prompt.contains("PREVIOUS SUMMARY:\nBuilt the parser."));
        assert!(prompt.contains("NEW ACTIVITY:\n$ cargo test"));
        assert!(prompt.contains("integrates"));
    }

    #[test]
    fn test_truncation_annotation() {
        let annotated = SummaryCompositor::annotate_truncated("Partial work.", 3, 5);
        assert!(annotated.starts_with("Partial work."));
        assert!(annotated.ends_with("[summary truncated: 3 of 5 chunks processed]"));

        let empty = SummaryCompositor::annotate_truncated("", 0, 5);
        assert_eq!(empty, "[summary truncated: 0 of 5 chunks processed]");
    }
}
