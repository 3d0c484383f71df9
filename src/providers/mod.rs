/*!
 * Translation backends.
 *
 * Every backend exposes the same capability: translate an ordered list of
 * strings into an ordered list of the same length, or fail.
 * - `web_gtx`: public gtx JSON endpoint
 * - `cloud`: authenticated Cloud Translation REST API
 * - `mobile_web`: HTML scraping of the mobile translation page
 * - `offline`: local engine invoked as a subprocess
 * - `mock`: scripted backend for tests
 */

use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use std::fmt::Debug;
use std::time::Duration;

use crate::app_config::TranslationProvider;
use crate::errors::ProviderError;

/// Common trait for all translation backends
///
/// Implementations are interchangeable: the fallback chain and the batch
/// translator only ever see this interface.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Which backend this is
    fn kind(&self) -> TranslationProvider;

    /// Whether the backend's prerequisites (API key, executable) are present
    fn is_available(&self) -> bool {
        true
    }

    /// Translate `texts`, returning exactly one string per input on success
    ///
    /// # Arguments
    /// * `texts` - Ordered strings to translate
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - Translations in input order or an error
    async fn translate(&self, texts: &[String]) -> Result<Vec<String>, ProviderError>;
}

/// Reject a result whose length differs from the input
pub fn ensure_count(expected: usize, translated: Vec<String>) -> Result<Vec<String>, ProviderError> {
    if translated.len() != expected {
        return Err(ProviderError::CountMismatch {
            expected,
            actual: translated.len(),
        });
    }
    Ok(translated)
}

/// Decode HTML entities returned by the Google endpoints
pub fn decode_html(text: &str) -> String {
    html_escape::decode_html_entities(text).to_string()
}

/// HTTP client with a fixed per-request timeout
///
/// Backends also set the timeout on every request, so the default client
/// used when the builder fails still honours it.
pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to build HTTP client ({}), using the default client", e);
            Client::new()
        })
}

/// Truncate a response body for logging
pub(crate) fn body_excerpt(body: &str) -> String {
    body.chars().take(240).collect()
}

pub mod cloud;
pub mod mobile_web;
pub mod mock;
pub mod offline;
pub mod web_gtx;

pub use cloud::CloudApi;
pub use mobile_web::MobileWeb;
pub use mock::{MockBehavior, MockProvider};
pub use offline::OfflineEngine;
pub use web_gtx::WebGtx;
