//! Bounded calls into a blocking `LlmProvider`

use crate::error::ExtractorError;
use folio_domain::traits::LlmProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Runs provider calls on the blocking pool, each bounded by a timeout
///
/// A timed-out call is reported, not retried. The abandoned call keeps
/// running on its blocking thread until the provider itself gives up.
pub struct GenerationClient<L: LlmProvider> {
    provider: Arc<L>,
    timeout: Duration,
}

impl<L: LlmProvider> Clone for GenerationClient<L> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            timeout: self.timeout,
        }
    }
}

impl<L> GenerationClient<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Wrap a provider
    pub fn new(provider: L, timeout: Duration) -> Self {
        Self::from_shared(Arc::new(provider), timeout)
    }

    /// Wrap a provider that is already shared
    pub fn from_shared(provider: Arc<L>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Model identifier
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Time bound per call
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one prompt and wait for the raw response
    pub async fn complete(&self, prompt: &str) -> Result<String, ExtractorError> {
        let llm = Arc::clone(&self.provider);
        let prompt = prompt.to_string();
        debug!("Prompt length: {} chars", prompt.len());

        // Call in a blocking context since LlmProvider is not async
        let call = tokio::task::spawn_blocking(move || {
            llm.generate(&prompt)
                .map_err(|e| ExtractorError::Llm(e.to_string()))
        });

        let response = timeout(self.timeout, call)
            .await
            .map_err(|_| ExtractorError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| ExtractorError::Llm(format!("Task join error: {}", e)))??;

        debug!("LLM response length: {} chars", response.len());
        Ok(response)
    }
}
