use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::app_config::TranslationProvider;
use crate::errors::ProviderError;
use super::{Provider, body_excerpt, http_client};

/// Client for the public gtx translation endpoint
///
/// Sends all strings of a batch as repeated `q` parameters of one GET
/// request and reads the nested-array JSON answer.
#[derive(Debug)]
pub struct WebGtx {
    /// HTTP client for API requests
    client: Client,
    /// Endpoint URL
    endpoint: String,
    /// Target language (ISO 639-1)
    target_language: String,
    /// Per-request timeout
    timeout: Duration,
}

impl WebGtx {
    /// Create a new gtx client
    pub fn new(endpoint: impl Into<String>, target_language: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            endpoint: endpoint.into(),
            target_language: target_language.into(),
            timeout,
        }
    }

    /// Build the request URL for a batch
    pub fn request_url(&self, texts: &[String]) -> Result<Url, ProviderError> {
        let mut params: Vec<(&str, &str)> = vec![
            ("client", "gtx"),
            ("sl", "auto"),
            ("tl", self.target_language.as_str()),
            ("dt", "t"),
        ];
        params.extend(texts.iter().map(|text| ("q", text.as_str())));

        Url::parse_with_params(&self.endpoint, &params)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid gtx endpoint '{}': {}", self.endpoint, e)))
    }
}

/// Join the first string of every sentence array
fn join_sentence_chunks(sentences: &[Value]) -> Option<String> {
    let joined: String = sentences.iter()
        .filter_map(|sentence| sentence.as_array()?.first()?.as_str())
        .collect();
    if joined.is_empty() { None } else { Some(joined) }
}

/// Parse a gtx response body into one translation per input string
pub fn parse_gtx_response(body: &str, expected: usize) -> Result<Vec<String>, ProviderError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("gtx response is not JSON: {}", e)))?;
    let first = root.as_array()
        .and_then(|root| root.first())
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::ParseError("gtx response has no translation array".to_string()))?;

    // A single input comes back as a flat list of sentence arrays
    if expected == 1 {
        if let Some(single) = join_sentence_chunks(first) {
            return Ok(vec![single]);
        }
    }

    if first.len() != expected {
        return Err(ProviderError::CountMismatch {
            expected,
            actual: first.len(),
        });
    }

    first.iter()
        .map(|element| {
            element.as_array()
                .and_then(|sentences| join_sentence_chunks(sentences))
                .ok_or_else(|| ProviderError::ParseError("gtx response element has no translated text".to_string()))
        })
        .collect()
}

#[async_trait]
impl Provider for WebGtx {
    fn kind(&self) -> TranslationProvider {
        TranslationProvider::WebGtx
    }

    async fn translate(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.request_url(texts)?;
        debug!("gtx request with {} strings", texts.len());

        let response = self.client.get(url).timeout(self.timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("gtx translation failed with status {}: {}", status, body_excerpt(&body));
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: body_excerpt(&body),
            });
        }

        let body = response.text().await?;
        parse_gtx_response(&body, texts.len())
    }
}
