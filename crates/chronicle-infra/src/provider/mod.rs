//! Generation provider implementations.
//!
//! `GeminiProvider` talks to the Google Generative Language REST API;
//! `OllamaProvider` talks to a local Ollama server. `ProviderBackend`
//! wraps whichever one the config selects behind a single
//! `GenerationProvider` so callers don't need generics at the app layer.

pub mod gemini;
pub mod ollama;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

use chronicle_core::provider::GenerationProvider;
use chronicle_types::config::{GlobalConfig, ProviderKind};
use chronicle_types::error::ProviderError;
use secrecy::SecretString;

/// Runtime-selected provider backend.
pub enum ProviderBackend {
    Gemini(GeminiProvider),
    Ollama(OllamaProvider),
}

impl ProviderBackend {
    /// Build the backend named by the configuration.
    ///
    /// The Gemini API key comes from `GEMINI_API_KEY` when set, otherwise
    /// from the config file.
    pub fn from_config(config: &GlobalConfig) -> Result<Self, ProviderError> {
        match config.provider {
            ProviderKind::Gemini => {
                let key = std::env::var("GEMINI_API_KEY")
                    .ok()
                    .or_else(|| config.gemini_api_key.clone())
                    .ok_or_else(|| {
                        ProviderError::InvalidRequest(
                            "Gemini API key not configured; set it with `chronicle config set gemini_api_key <KEY>` or export GEMINI_API_KEY"
                                .to_string(),
                        )
                    })?;
                Ok(ProviderBackend::Gemini(GeminiProvider::new(SecretString::from(key))))
            }
            ProviderKind::Ollama => Ok(ProviderBackend::Ollama(OllamaProvider::new(
                config.ollama_host.clone(),
            ))),
        }
    }
}

impl GenerationProvider for ProviderBackend {
    fn name(&self) -> &str {
        match self {
            ProviderBackend::Gemini(p) => p.name(),
            ProviderBackend::Ollama(p) => p.name(),
        }
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<String, ProviderError> {
        match self {
            ProviderBackend::Gemini(p) => p.generate(prompt, model).await,
            ProviderBackend::Ollama(p) => p.generate(prompt, model).await,
        }
    }
}
