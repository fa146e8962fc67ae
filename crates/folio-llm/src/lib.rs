//! Folio LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `folio-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: scripted responses for tests, with call counting
//! - `GeminiProvider`: Google Generative Language API
//! - `OllamaProvider`: local Ollama API
//!
//! Providers never retry. A failed or timed-out call is reported to the
//! caller as-is.
//!
//! # Examples
//!
//! ```
//! use folio_llm::MockProvider;
//! use folio_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("date,event\n2024-01-01,launch");
//! let result = provider.generate("list all dates").unwrap();
//! assert!(result.starts_with("date,event"));
//! assert_eq!(provider.call_count(), 1);
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod ollama;

use folio_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The request exceeded the client timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Missing credentials or endpoint
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    queued: VecDeque<String>,
    rules: Vec<(String, Option<String>)>,
    prompts: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Responses are chosen in this order: the first rule whose fragment occurs
/// in the prompt, then the next queued response, then the default response.
/// Clones share state, so a clone handed to the pipeline can be inspected
/// from the test afterwards.
///
/// # Examples
///
/// ```
/// use folio_llm::MockProvider;
/// use folio_domain::traits::LlmProvider;
///
/// let provider = MockProvider::new("fallback")
///     .with_queue(["first", "second"])
///     .respond_when_contains("Chunk 3", "third chunk");
///
/// assert_eq!(provider.generate("anything").unwrap(), "first");
/// assert_eq!(provider.generate("about Chunk 3").unwrap(), "third chunk");
/// assert_eq!(provider.generate("anything").unwrap(), "second");
/// assert_eq!(provider.generate("anything").unwrap(), "fallback");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    delay: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            delay: None,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Queue responses returned one per call, before the default
    pub fn with_queue<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().queued.extend(responses.into_iter().map(Into::into));
        self
    }

    /// Answer `response` whenever the prompt contains `fragment`
    pub fn respond_when_contains(
        self,
        fragment: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.lock().rules.push((fragment.into(), Some(response.into())));
        self
    }

    /// Fail whenever the prompt contains `fragment`
    pub fn fail_when_contains(self, fragment: impl Into<String>) -> Self {
        self.lock().rules.push((fragment.into(), None));
        self
    }

    /// Sleep this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.lock().prompts.len()
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    /// Forget recorded prompts
    pub fn reset_call_count(&self) {
        self.lock().prompts.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let mut state = self.lock();
        state.prompts.push(prompt.to_string());

        let rule = state
            .rules
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, response)| response.clone());
        match rule {
            Some(Some(response)) => return Ok(response),
            Some(None) => return Err(LlmError::Other("Mock error".to_string())),
            None => {}
        }

        Ok(state
            .queued
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone()))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
