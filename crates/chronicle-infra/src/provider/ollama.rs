//! OllamaProvider -- concrete [`GenerationProvider`] for a local Ollama
//! server.
//!
//! Non-streaming `/api/generate` requests. A local server has no quota,
//! so every failure short of a malformed request maps to a transient
//! error.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use chronicle_core::provider::GenerationProvider;
use chronicle_types::error::ProviderError;

/// Local Ollama inference server provider.
pub struct OllamaProvider {
    client: reqwest::Client,
    host: String,
}

impl OllamaProvider {
    pub fn new(host: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .expect("failed to create reqwest client");

        Self { client, host }
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl GenerationProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.host);
        let body = OllamaRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                404 => ProviderError::InvalidRequest(format!("model '{model}' not found: {error_body}")),
                400 => ProviderError::InvalidRequest(error_body),
                _ => ProviderError::Transient(format!("HTTP {status}: {error_body}")),
            });
        }

        let parsed: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Transient(format!("failed to parse response: {e}")))?;

        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_without_streaming() {
        let body = OllamaRequest {
            model: "qwen2.5:32b",
            prompt: "hello",
            stream: false,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"stream\":false"));
        assert!(json.contains("qwen2.5:32b"));
    }
}
