use async_trait::async_trait;
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::app_config::TranslationProvider;
use crate::errors::ProviderError;
use super::{Provider, body_excerpt, decode_html, http_client};

/// Desktop browser identity; the mobile page refuses unknown agents
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0 Safari/537.36";

static RESULT_CONTAINER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="result-container">(.*?)</div>"#).expect("result container pattern is valid")
});

/// Scraper for the mobile translation web page
///
/// One request per string, sent sequentially. Any failed string fails the
/// whole batch.
#[derive(Debug)]
pub struct MobileWeb {
    client: Client,
    endpoint: String,
    target_language: String,
    timeout: Duration,
}

impl MobileWeb {
    pub fn new(endpoint: impl Into<String>, target_language: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            endpoint: endpoint.into(),
            target_language: target_language.into(),
            timeout,
        }
    }

    fn request_url(&self, text: &str) -> Result<Url, ProviderError> {
        Url::parse_with_params(
            &self.endpoint,
            &[("sl", "auto"), ("tl", self.target_language.as_str()), ("q", text)],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid mobile endpoint '{}': {}", self.endpoint, e)))
    }

    async fn translate_one(&self, text: &str) -> Result<String, ProviderError> {
        let url = self.request_url(text)?;
        let response = self.client.get(url)
            .header("User-Agent", BROWSER_USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Mobile translation failed with status {}: {}", status, body_excerpt(&body));
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: body_excerpt(&body),
            });
        }

        let html = response.text().await?;
        extract_result(&html)
    }
}

/// Pull the translated text out of the mobile page markup
pub fn extract_result(html: &str) -> Result<String, ProviderError> {
    let captured = RESULT_CONTAINER_REGEX.captures(html)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| ProviderError::ParseError("Mobile page has no result container".to_string()))?;
    Ok(decode_html(captured.as_str()).trim().to_string())
}

#[async_trait]
impl Provider for MobileWeb {
    fn kind(&self) -> TranslationProvider {
        TranslationProvider::MobileWeb
    }

    async fn translate(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        debug!("Mobile web translation of {} strings", texts.len());
        let mut translated = Vec::with_capacity(texts.len());
        for text in texts {
            translated.push(self.translate_one(text).await?);
        }
        Ok(translated)
    }
}
