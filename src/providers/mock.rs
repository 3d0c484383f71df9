/*!
 * Mock provider implementations for testing.
 *
 * This module provides a scripted backend that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with prefixed text
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::fail_first(n)` - Fails the first n calls, then succeeds
 * - `MockProvider::rejecting_batches_over(n)` - Fails batches larger than n strings
 *
 * Clones share the call counter and call log, so a test can keep a handle
 * while the registry owns another.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::app_config::TranslationProvider;
use crate::errors::ProviderError;
use crate::providers::Provider;

/// Prefix added by the default working behavior
pub const MOCK_PREFIX: &str = "[TRANSLATED] ";

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Always fails with an error
    Failing,
    /// Reports itself unavailable and refuses every call
    Unavailable,
    /// Succeeds but drops the last string of the batch
    CountMismatch,
    /// Fails the first `failures` calls, then works
    FailFirst { failures: usize },
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Fails any batch with more than this many strings
    RejectBatchesLargerThan(usize),
    /// Fails any batch holding a string longer than this many characters
    RejectTextsLongerThan(usize),
    /// Simulates slow response (for cancellation and deadline testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Backend identity reported to the chain
    kind: TranslationProvider,
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for scripted failures
    request_count: Arc<AtomicUsize>,
    /// Every batch received, in call order
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            kind: TranslationProvider::WebGtx,
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose prerequisites are missing
    pub fn unavailable() -> Self {
        Self::new(MockBehavior::Unavailable)
    }

    /// Create a mock that fails its first `failures` calls
    pub fn fail_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst { failures })
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock that only accepts batches of up to `max_batch` strings
    pub fn rejecting_batches_over(max_batch: usize) -> Self {
        Self::new(MockBehavior::RejectBatchesLargerThan(max_batch))
    }

    /// Create a mock that only accepts strings of up to `max_chars` characters
    pub fn rejecting_texts_over(max_chars: usize) -> Self {
        Self::new(MockBehavior::RejectTextsLongerThan(max_chars))
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Report a different backend identity
    pub fn with_kind(mut self, kind: TranslationProvider) -> Self {
        self.kind = kind;
        self
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of `translate` calls so far, across clones
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Batches received so far, across clones
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    fn render(&self, text: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(text),
            None => format!("{}{}", MOCK_PREFIX, text),
        }
    }

    fn render_all(&self, texts: &[String]) -> Vec<String> {
        texts.iter().map(|text| self.render(text)).collect()
    }

    fn simulated_failure(&self, message: String) -> ProviderError {
        ProviderError::ApiError {
            status_code: 503,
            message,
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            calls: Arc::clone(&self.calls),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn kind(&self) -> TranslationProvider {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.behavior != MockBehavior::Unavailable
    }

    async fn translate(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        if self.behavior == MockBehavior::Unavailable {
            return Err(ProviderError::Unavailable("Simulated missing prerequisite".to_string()));
        }

        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(texts.to_vec());

        match self.behavior {
            MockBehavior::Working => Ok(self.render_all(texts)),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Unavailable => Err(ProviderError::Unavailable("Simulated missing prerequisite".to_string())),

            MockBehavior::CountMismatch => {
                let mut translated = self.render_all(texts);
                translated.pop();
                Ok(translated)
            }

            MockBehavior::FailFirst { failures } => {
                if count < failures {
                    Err(self.simulated_failure(format!("Simulated failure (request #{})", count + 1)))
                } else {
                    Ok(self.render_all(texts))
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(self.simulated_failure(format!("Simulated intermittent failure (request #{})", count + 1)))
                } else {
                    Ok(self.render_all(texts))
                }
            }

            MockBehavior::RejectBatchesLargerThan(max_batch) => {
                if texts.len() > max_batch {
                    Err(self.simulated_failure(format!("Batch of {} strings rejected", texts.len())))
                } else {
                    Ok(self.render_all(texts))
                }
            }

            MockBehavior::RejectTextsLongerThan(max_chars) => {
                if texts.iter().any(|text| text.chars().count() > max_chars) {
                    Err(self.simulated_failure(format!("String longer than {} characters rejected", max_chars)))
                } else {
                    Ok(self.render_all(texts))
                }
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.render_all(texts))
            }
        }
    }
}
