use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::app_config::TranslationProvider;
use crate::errors::ProviderError;
use super::{Provider, body_excerpt, decode_html, ensure_count, http_client};

/// Client for the authenticated Cloud Translation v2 API
#[derive(Debug)]
pub struct CloudApi {
    /// HTTP client for API requests
    client: Client,
    /// API endpoint URL
    endpoint: String,
    /// API key; the backend is unavailable without one
    api_key: Option<String>,
    /// Target language (ISO 639-1)
    target_language: String,
    /// Per-request timeout
    timeout: Duration,
}

/// Cloud translation request body
#[derive(Debug, Serialize)]
pub struct CloudRequest<'a> {
    /// Strings to translate
    q: &'a [String],
    /// Target language
    target: &'a str,
    /// Treat input as plain text, not HTML
    format: &'a str,
}

/// Cloud translation response
#[derive(Debug, Deserialize)]
pub struct CloudResponse {
    pub data: CloudResponseData,
}

#[derive(Debug, Deserialize)]
pub struct CloudResponseData {
    pub translations: Vec<CloudTranslation>,
}

/// One translated string
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudTranslation {
    pub translated_text: String,
    #[serde(default)]
    pub detected_source_language: Option<String>,
}

impl CloudApi {
    /// Create a new Cloud API client. A blank key leaves the backend unavailable.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        target_language: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: http_client(timeout),
            endpoint: endpoint.into(),
            api_key: api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            target_language: target_language.into(),
            timeout,
        }
    }
}

/// Parse a Cloud API response body into one translation per input string
pub fn parse_cloud_response(body: &str, expected: usize) -> Result<Vec<String>, ProviderError> {
    let response: CloudResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("Cloud API response: {}", e)))?;
    let translations = response.data.translations.into_iter()
        .map(|t| decode_html(&t.translated_text))
        .collect();
    ensure_count(expected, translations)
}

#[async_trait]
impl Provider for CloudApi {
    fn kind(&self) -> TranslationProvider {
        TranslationProvider::CloudApi
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn translate(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::Unavailable(
                "Cloud API key is missing. Set it in the config or via GOOGLE_CLOUD_TRANSLATE_API_KEY / GOOGLE_API_KEY.".to_string(),
            ));
        };
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = Url::parse_with_params(&self.endpoint, &[("key", api_key)])
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid Cloud API endpoint '{}': {}", self.endpoint, e)))?;
        let request = CloudRequest {
            q: texts,
            target: &self.target_language,
            format: "text",
        };
        debug!("Cloud API request with {} strings", texts.len());

        let response = self.client.post(url)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Cloud translation request error: {}", e);
                ProviderError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Cloud translation failed with status {}: {}", status, body_excerpt(&body));
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: body_excerpt(&body),
            });
        }

        let body = response.text().await?;
        parse_cloud_response(&body, texts.len())
    }
}
