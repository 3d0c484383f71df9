/*!
 * HTTP backends exercised against a local mock server
 */

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use transon::app_config::TranslationProvider;
use transon::errors::ProviderError;
use transon::providers::mobile_web::BROWSER_USER_AGENT;
use transon::providers::{CloudApi, MobileWeb, Provider, WebGtx};
use transon::translation::{RequestContext, TranslationStatus};
use transon::TranslationService;
use crate::common;

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_web_gtx_withBatch_shouldSendRepeatedQueriesAndParseEachElement() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .and(query_param("client", "gtx"))
        .and(query_param("sl", "auto"))
        .and(query_param("tl", "ru"))
        .and(query_param("dt", "t"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[[[["Привет мир","Hello world",null,null,10]],[["Здравствуй, ","Bonjour ",null,null,10],["мир","le monde",null,null,10]]],null,"en"]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = WebGtx::new(format!("{}/translate_a/single", server.uri()), "ru", Duration::from_secs(5));
    let result = client.translate(&texts(&["Hello world", "Bonjour le monde"])).await.unwrap();

    assert_eq!(result, vec!["Привет мир", "Здравствуй, мир"]);
}

#[tokio::test]
async fn test_web_gtx_withServerError_shouldReturnApiError() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let client = WebGtx::new(format!("{}/translate_a/single", server.uri()), "ru", Duration::from_secs(5));
    let result = client.translate(&texts(&["Hello"])).await;

    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 503, .. })));
}

#[tokio::test]
async fn test_web_gtx_withSlowServer_shouldFailWithTimeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)).set_body_string("[]"))
        .mount(&server)
        .await;

    let client = WebGtx::new(format!("{}/translate_a/single", server.uri()), "ru", Duration::from_millis(200));
    let result = client.translate(&texts(&["Hello"])).await;

    assert!(matches!(result, Err(ProviderError::Timeout(_))));
}

#[tokio::test]
async fn test_mobile_web_withSlowServer_shouldFailWithTimeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_string("<div class=\"result-container\">late</div>"),
        )
        .mount(&server)
        .await;

    let client = MobileWeb::new(format!("{}/m", server.uri()), "ru", Duration::from_millis(200));
    let result = client.translate(&texts(&["late"])).await;

    assert!(matches!(result, Err(ProviderError::Timeout(_))));
}

#[tokio::test]
async fn test_cloud_api_withKey_shouldPostJsonAndDecodeEntities() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/language/translate/v2"))
        .and(query_param("key", "test-key"))
        .and(body_json(json!({"q": ["Tom & Jerry", "Quotes"], "target": "ru", "format": "text"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"translations": [
                {"translatedText": "Том &amp; Джерри", "detectedSourceLanguage": "en"},
                {"translatedText": "&quot;Кавычки&quot;", "detectedSourceLanguage": "en"}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CloudApi::new(
        format!("{}/language/translate/v2", server.uri()),
        Some("test-key".to_string()),
        "ru",
        Duration::from_secs(5),
    );
    let result = client.translate(&texts(&["Tom & Jerry", "Quotes"])).await.unwrap();

    assert_eq!(result, vec!["Том & Джерри", "\"Кавычки\""]);
}

#[tokio::test]
async fn test_cloud_api_withoutKey_shouldNotTouchNetwork() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = CloudApi::new(format!("{}/language/translate/v2", server.uri()), None, "ru", Duration::from_secs(5));
    let result = client.translate(&texts(&["Hello"])).await;

    assert!(matches!(result, Err(ProviderError::Unavailable(_))));
}

#[tokio::test]
async fn test_cloud_api_withForbidden_shouldReturnApiError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string(r#"{"error":{"message":"API key not valid"}}"#))
        .mount(&server)
        .await;

    let client = CloudApi::new(
        format!("{}/language/translate/v2", server.uri()),
        Some("bad-key".to_string()),
        "ru",
        Duration::from_secs(5),
    );
    let result = client.translate(&texts(&["Hello"])).await;

    match result {
        Err(ProviderError::ApiError { status_code, message }) => {
            assert_eq!(status_code, 403);
            assert!(message.contains("API key not valid"));
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mobile_web_withTwoStrings_shouldScrapeEachSequentially() {
    let server = MockServer::start().await;
    for (source, translated) in [("one", "один"), ("two", "два &amp; три")] {
        Mock::given(method("GET"))
            .and(path("/m"))
            .and(query_param("q", source))
            .and(query_param("tl", "ru"))
            .and(header("User-Agent", BROWSER_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><div class=\"result-container\">\n {} \n</div></html>",
                translated
            )))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = MobileWeb::new(format!("{}/m", server.uri()), "ru", Duration::from_secs(5));
    let result = client.translate(&texts(&["one", "two"])).await.unwrap();

    assert_eq!(result, vec!["один", "два & три"]);
}

#[tokio::test]
async fn test_mobile_web_withMissingResultContainer_shouldFailWholeBatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "one"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<div class=\"result-container\">один</div>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "two"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&server)
        .await;

    let client = MobileWeb::new(format!("{}/m", server.uri()), "ru", Duration::from_secs(5));
    let result = client.translate(&texts(&["one", "two"])).await;

    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[tokio::test]
async fn test_service_withConfiguredEndpoint_shouldTranslateThroughHttpBackend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[[[["Привет мир","Hello world"]],[["Здравствуй мир","Bonjour le monde"]]]]"#,
        ))
        .mount(&server)
        .await;

    let mut config = common::fast_config();
    config.translation.provider = TranslationProvider::WebGtx;
    config.translation.provider_config_mut(TranslationProvider::WebGtx).endpoint =
        format!("{}/translate_a/single", server.uri());
    let service = TranslationService::new(config).unwrap();

    let outcome = service
        .translate("Hello world\n\nBonjour le monde", &RequestContext::new())
        .await
        .unwrap();

    assert_eq!(outcome.status, TranslationStatus::Translated);
    assert_eq!(outcome.text.as_deref(), Some("Привет мир\n\nЗдравствуй мир"));
}
