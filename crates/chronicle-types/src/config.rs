//! Global configuration types for Chronicle.
//!
//! `GlobalConfig` represents the top-level `config.toml`: the generation
//! provider choice, the model catalog, and the summarization engine knobs
//! (chunk-size bands, retry cap, provider timeout). All fields have
//! sensible defaults so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ModelCatalog;

/// Which generation backend summarization calls go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Ollama,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(format!("invalid provider: '{other}' (expected gemini or ollama)")),
        }
    }
}

/// Summarization engine knobs. Supplied by configuration, never computed
/// by the engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Chunk size for transcripts up to `medium_transcript_lines` lines.
    #[serde(default = "default_small_chunk_lines")]
    pub small_chunk_lines: u32,

    /// Chunk size for transcripts between the small and large boundaries.
    #[serde(default = "default_medium_chunk_lines")]
    pub medium_chunk_lines: u32,

    /// Chunk size for transcripts past `large_transcript_lines` lines.
    #[serde(default = "default_large_chunk_lines")]
    pub large_chunk_lines: u32,

    /// Upper line-count bound of the small band.
    #[serde(default = "default_medium_transcript_lines")]
    pub medium_transcript_lines: u32,

    /// Upper line-count bound of the medium band.
    #[serde(default = "default_large_transcript_lines")]
    pub large_transcript_lines: u32,

    /// Retries per chunk after the first attempt fails.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Wall-clock bound on one provider call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_small_chunk_lines() -> u32 {
    3_000
}

fn default_medium_chunk_lines() -> u32 {
    5_000
}

fn default_large_chunk_lines() -> u32 {
    10_000
}

fn default_medium_transcript_lines() -> u32 {
    10_000
}

fn default_large_transcript_lines() -> u32 {
    50_000
}

fn default_max_retries() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            small_chunk_lines: default_small_chunk_lines(),
            medium_chunk_lines: default_medium_chunk_lines(),
            large_chunk_lines: default_large_chunk_lines(),
            medium_transcript_lines: default_medium_transcript_lines(),
            large_transcript_lines: default_large_transcript_lines(),
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Top-level configuration for Chronicle.
///
/// Loaded from `~/.chronicle/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Generation backend for summaries.
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    /// Gemini API key. `GEMINI_API_KEY` in the environment takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    /// Ollama server URL.
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,

    /// Model used when the provider is Ollama (no catalog rotation there).
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    /// Repositories tracked by `chronicle repo sync`.
    #[serde(default)]
    pub repositories: Vec<String>,

    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Ordered model catalog for the Gemini provider.
    #[serde(default)]
    pub models: ModelCatalog,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Gemini
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "qwen2.5:32b".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            gemini_api_key: None,
            ollama_host: default_ollama_host(),
            ollama_model: default_ollama_model(),
            repositories: Vec::new(),
            summarizer: SummarizerConfig::default(),
            models: ModelCatalog::default(),
        }
    }
}

impl GlobalConfig {
    /// Track a repository path, ignoring duplicates.
    pub fn add_repository(&mut self, path: &str) {
        if !self.repositories.iter().any(|r| r == path) {
            self.repositories.push(path.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.summarizer.small_chunk_lines, 3_000);
        assert_eq!(config.summarizer.max_retries, 5);
        assert!(!config.models.is_empty());
    }

    #[test]
    fn test_empty_toml_is_valid() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.ollama_host, "http://localhost:11434");
        assert_eq!(config.summarizer.request_timeout_secs, 120);
    }

    #[test]
    fn test_toml_with_values() {
        let toml_str = r#"
provider = "ollama"
ollama_model = "llama3:8b"
repositories = ["/home/dev/project"]

[summarizer]
max_retries = 3
request_timeout_secs = 60
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.ollama_model, "llama3:8b");
        assert_eq!(config.repositories, vec!["/home/dev/project"]);
        assert_eq!(config.summarizer.max_retries, 3);
        assert_eq!(config.summarizer.request_timeout_secs, 60);
        // Unset band fields keep their defaults
        assert_eq!(config.summarizer.large_chunk_lines, 10_000);
    }

    #[test]
    fn test_add_repository_dedupes() {
        let mut config = GlobalConfig::default();
        config.add_repository("/a");
        config.add_repository("/b");
        config.add_repository("/a");
        assert_eq!(config.repositories, vec!["/a", "/b"]);
    }

    #[test]
    fn test_provider_kind_roundtrip() {
        for kind in [ProviderKind::Gemini, ProviderKind::Ollama] {
            let s = kind.to_string();
            let parsed: ProviderKind = s.parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }
}
