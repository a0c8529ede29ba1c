//! GeminiProvider -- concrete [`GenerationProvider`] for the Google
//! Generative Language API.
//!
//! Sends non-streaming `generateContent` requests. A 429 response maps to
//! the rate-limited error, carrying the server's suggested delay when the
//! error payload includes a RetryInfo detail; 5xx maps to a transient
//! error so the retry controller backs off and tries again.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use chronicle_core::provider::GenerationProvider;
use chronicle_types::error::ProviderError;

/// Google Generative Language API provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

/// Pull the RetryInfo delay out of a 429 error payload, e.g.
/// `{"@type": ".../google.rpc.RetryInfo", "retryDelay": "14s"}`.
fn retry_delay_from_details(details: &[serde_json::Value]) -> Option<u64> {
    details.iter().find_map(|detail| {
        let delay = detail.get("retryDelay")?.as_str()?;
        let secs: f64 = delay.strip_suffix('s')?.parse().ok()?;
        Some((secs * 1_000.0) as u64)
    })
}

impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(self.url(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_header = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1_000);

            let error_body = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                429 => {
                    let detail_delay = serde_json::from_str::<ErrorEnvelope>(&error_body)
                        .ok()
                        .and_then(|env| retry_delay_from_details(&env.error.details));
                    ProviderError::RateLimited {
                        retry_after_ms: retry_after_header.or(detail_delay),
                    }
                }
                401 | 403 => ProviderError::AuthenticationFailed,
                400 => {
                    let message = serde_json::from_str::<ErrorEnvelope>(&error_body)
                        .map(|env| env.error.message)
                        .unwrap_or(error_body);
                    ProviderError::InvalidRequest(message)
                }
                _ => ProviderError::Transient(format!("HTTP {status}: {error_body}")),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Transient(format!("failed to parse response: {e}")))?;

        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::Transient("empty completion".to_string()));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_parsed_from_details() {
        let details: Vec<serde_json::Value> = vec![
            serde_json::json!({"@type": "type.googleapis.com/google.rpc.ErrorInfo"}),
            serde_json::json!({
                "@type": "type.googleapis.com/google.rpc.RetryInfo",
                "retryDelay": "14s"
            }),
        ];
        assert_eq!(retry_delay_from_details(&details), Some(14_000));
    }

    #[test]
    fn test_retry_delay_fractional_seconds() {
        let details = vec![serde_json::json!({"retryDelay": "2.5s"})];
        assert_eq!(retry_delay_from_details(&details), Some(2_500));
    }

    #[test]
    fn test_retry_delay_absent() {
        let details = vec![serde_json::json!({"@type": "whatever"})];
        assert_eq!(retry_delay_from_details(&details), None);
        assert_eq!(retry_delay_from_details(&[]), None);
    }

    #[test]
    fn test_error_envelope_parses() {
        let body = r#"{"error":{"code":429,"message":"Resource exhausted","status":"RESOURCE_EXHAUSTED","details":[{"retryDelay":"10s"}]}}"#;
        let env: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(env.error.message, "Resource exhausted");
        assert_eq!(retry_delay_from_details(&env.error.details), Some(10_000));
    }

    #[test]
    fn test_url_includes_model() {
        let provider = GeminiProvider::new(SecretString::from("test-key".to_string()))
            .with_base_url("http://localhost:9999".to_string());
        assert_eq!(
            provider.url("gemini-2.0-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
