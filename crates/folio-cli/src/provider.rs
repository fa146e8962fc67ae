//! Provider selection from configuration.

use crate::config::{ProviderConfig, ProviderKind, API_KEY_ENV};
use crate::error::{CliError, Result};
use folio_domain::traits::LlmProvider;
use folio_llm::{GeminiProvider, LlmError, OllamaProvider};
use std::time::Duration;
use tracing::info;

/// The configured provider.
pub enum AnyProvider {
    /// Google Generative Language API
    Gemini(GeminiProvider),
    /// Local Ollama server
    Ollama(OllamaProvider),
}

impl LlmProvider for AnyProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        match self {
            AnyProvider::Gemini(p) => p.generate(prompt),
            AnyProvider::Ollama(p) => p.generate(prompt),
        }
    }

    fn model_name(&self) -> &str {
        match self {
            AnyProvider::Gemini(p) => p.model_name(),
            AnyProvider::Ollama(p) => p.model_name(),
        }
    }
}

/// Build the provider named in `config`.
///
/// Gemini needs an API key from the config file or `GEMINI_API_KEY`.
/// Must be called outside the async runtime: both providers own a
/// blocking HTTP client.
pub fn build_provider(config: &ProviderConfig, timeout: Duration) -> Result<AnyProvider> {
    let model = config.model_or_default();
    let endpoint = config.endpoint_or_default();

    let provider = match config.kind {
        ProviderKind::Gemini => {
            let api_key = config
                .resolve_api_key(std::env::var(API_KEY_ENV).ok())
                .ok_or_else(|| {
                    CliError::Config(format!(
                        "No Gemini API key: set provider.api_key or {}",
                        API_KEY_ENV
                    ))
                })?;
            AnyProvider::Gemini(GeminiProvider::with_options(endpoint, api_key, model, timeout)?)
        }
        ProviderKind::Ollama => {
            AnyProvider::Ollama(OllamaProvider::with_timeout(endpoint, model, timeout)?)
        }
    };

    info!("Using {:?} provider with model {}", config.kind, model);
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_from_config() {
        let config = ProviderConfig {
            kind: ProviderKind::Ollama,
            model: Some("mistral".into()),
            ..Default::default()
        };
        let provider = build_provider(&config, Duration::from_secs(5)).unwrap();
        assert!(matches!(provider, AnyProvider::Ollama(_)));
        assert_eq!(provider.model_name(), "mistral");
    }

    #[test]
    fn test_gemini_provider_with_configured_key() {
        let config = ProviderConfig {
            kind: ProviderKind::Gemini,
            api_key: Some("test-key".into()),
            ..Default::default()
        };
        let provider = build_provider(&config, Duration::from_secs(5)).unwrap();
        assert!(matches!(provider, AnyProvider::Gemini(_)));
        assert_eq!(provider.model_name(), folio_llm::gemini::DEFAULT_MODEL);
    }
}
