//! GenerationProvider trait definition.
//!
//! The narrow boundary to the text-generation backend: one prompt in, one
//! completion out. Rate limiting is a distinguishable error variant
//! (optionally carrying the provider's suggested delay) so the retry
//! controller can treat it differently from generic transient failures.
//!
//! Implementations live in chronicle-infra (`GeminiProvider`,
//! `OllamaProvider`). Uses native async fn in traits (RPITIT, Rust 2024
//! edition).

use chronicle_types::error::ProviderError;

/// Trait for text-generation backends.
pub trait GenerationProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini", "ollama").
    fn name(&self) -> &str;

    /// Generate a completion for `prompt` with the named model variant.
    fn generate(
        &self,
        prompt: &str,
        model: &str,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;
}
