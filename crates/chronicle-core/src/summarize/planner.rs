//! Chunk planner: deterministic partition of a transcript into line ranges.
//!
//! The mapping from (total line count, chunk size) to ranges is a pure
//! function with no side effects, so a resumed run recomputes identical
//! boundaries instead of storing them.

use chronicle_types::config::SummarizerConfig;

/// Half-open line range `[start, end)` within a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Pick the chunk size band for a transcript.
///
/// - up to `medium_transcript_lines` lines: `small_chunk_lines`
/// - up to `large_transcript_lines` lines: `medium_chunk_lines`
/// - beyond that: `large_chunk_lines`
///
/// The two larger bands assume a model that can absorb big chunks; when
/// the active catalog has none, everything runs at the small size.
pub fn chunk_size_hint(
    total_lines: u32,
    config: &SummarizerConfig,
    catalog_has_large_chunk_model: bool,
) -> u32 {
    if !catalog_has_large_chunk_model {
        return config.small_chunk_lines;
    }

    if total_lines <= config.medium_transcript_lines {
        config.small_chunk_lines
    } else if total_lines <= config.large_transcript_lines {
        config.medium_chunk_lines
    } else {
        config.large_chunk_lines
    }
}

/// Partition `[0, total_lines)` into consecutive ranges of `chunk_lines`,
/// the final range truncated to the total.
pub fn plan(total_lines: u32, chunk_lines: u32) -> Vec<LineRange> {
    assert!(chunk_lines > 0, "chunk size must be positive");

    let mut ranges = Vec::new();
    let mut start = 0;
    while start < total_lines {
        let end = (start + chunk_lines).min(total_lines);
        ranges.push(LineRange { start, end });
        start = end;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SummarizerConfig {
        SummarizerConfig::default()
    }

    #[test]
    fn test_plan_exact_multiple() {
        let ranges = plan(12_000, 3_000);
        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges[0], LineRange { start: 0, end: 3_000 });
        assert_eq!(ranges[3], LineRange { start: 9_000, end: 12_000 });
    }

    #[test]
    fn test_plan_truncates_final_range() {
        let ranges = plan(7_500, 3_000);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[2], LineRange { start: 6_000, end: 7_500 });
        assert_eq!(ranges[2].len(), 1_500);
    }

    #[test]
    fn test_plan_tiles_without_gaps_or_overlaps() {
        for total in [1, 2_999, 3_000, 3_001, 10_000, 54_321] {
            let ranges = plan(total, 3_000);
            assert_eq!(ranges[0].start, 0);
            assert_eq!(ranges.last().unwrap().end, total);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            assert!(ranges.iter().all(|r| !r.is_empty()));
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        assert_eq!(plan(44_000, 5_000), plan(44_000, 5_000));
    }

    #[test]
    fn test_plan_empty_transcript() {
        assert!(plan(0, 3_000).is_empty());
    }

    #[test]
    fn test_hint_bands() {
        let cfg = config();
        assert_eq!(chunk_size_hint(10_000, &cfg, true), 3_000);
        assert_eq!(chunk_size_hint(10_001, &cfg, true), 5_000);
        assert_eq!(chunk_size_hint(50_000, &cfg, true), 5_000);
        assert_eq!(chunk_size_hint(50_001, &cfg, true), 10_000);
    }

    #[test]
    fn test_hint_without_large_chunk_model() {
        let cfg = config();
        // No model can absorb big chunks: every band collapses to small.
        assert_eq!(chunk_size_hint(80_000, &cfg, false), 3_000);
    }
}
