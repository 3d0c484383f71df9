/*!
 * End-to-end tests of the translation pipeline over mock backends
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use transon::app_config::TranslationProvider;
use transon::errors::TranslationError;
use transon::providers::{MockProvider, OfflineEngine};
use transon::translation::{ProviderRegistry, RequestContext, TranslationStatus};
use transon::TranslationService;
use crate::common;

fn gtx(provider: MockProvider) -> MockProvider {
    provider.with_kind(TranslationProvider::WebGtx)
}

fn mobile(provider: MockProvider) -> MockProvider {
    provider.with_kind(TranslationProvider::MobileWeb)
}

fn cloud(provider: MockProvider) -> MockProvider {
    provider.with_kind(TranslationProvider::CloudApi)
}

#[tokio::test]
async fn test_translate_withTwoParagraphs_shouldKeepSeparatorAndBatchOnce() {
    let backend = gtx(MockProvider::working());
    let service = common::service_with(TranslationProvider::WebGtx, &[backend.clone()]);

    let outcome = service.translate("Hello world\n\nBonjour le monde", &RequestContext::new()).await.unwrap();

    assert_eq!(outcome.status, TranslationStatus::Translated);
    assert_eq!(
        outcome.text.as_deref(),
        Some("[TRANSLATED] Hello world\n\n[TRANSLATED] Bonjour le monde")
    );
    assert_eq!(backend.calls(), vec![vec!["Hello world".to_string(), "Bonjour le monde".to_string()]]);
}

#[tokio::test]
async fn test_translate_withEmptyInput_shouldNotCallBackends() {
    let backend = gtx(MockProvider::working());
    let service = common::service_with(TranslationProvider::WebGtx, &[backend.clone()]);

    for input in ["", "   ", "\n\n\t"] {
        let outcome = service.translate(input, &RequestContext::new()).await.unwrap();
        assert_eq!(outcome.status, TranslationStatus::NothingToTranslate);
        assert!(outcome.text.is_none());
    }
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_translate_withCyrillicInput_shouldReturnTrimmedTextUnchanged() {
    let backend = gtx(MockProvider::working());
    let service = common::service_with(TranslationProvider::WebGtx, &[backend.clone()]);

    let outcome = service.translate("\n  Уже переведено.\n\nВторой абзац.  ", &RequestContext::new()).await.unwrap();

    assert_eq!(outcome.status, TranslationStatus::Skipped);
    assert_eq!(outcome.text.as_deref(), Some("Уже переведено.\n\nВторой абзац."));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_translate_withAllBackendsFailing_shouldReturnOriginalWithoutError() {
    let primary = gtx(MockProvider::failing());
    let fallback = mobile(MockProvider::failing());
    let missing_key = cloud(MockProvider::unavailable());
    let service = common::service_with(
        TranslationProvider::WebGtx,
        &[primary.clone(), fallback.clone(), missing_key.clone()],
    );

    let input = "First paragraph.\n\n\nSecond paragraph.";
    let outcome = service.translate(input, &RequestContext::new()).await.unwrap();

    assert_eq!(outcome.status, TranslationStatus::Original);
    assert_eq!(outcome.text.as_deref(), Some(input));
    // Without a key the chain is gtx then mobile; the cloud backend is never asked
    assert_eq!(missing_key.call_count(), 0);
    assert_eq!(primary.call_count(), fallback.call_count());
    assert!(primary.call_count() > 0);
}

#[tokio::test]
async fn test_translate_withFailingPrimary_shouldUseFallbackBackend() {
    let primary = mobile(MockProvider::failing());
    let fallback = gtx(MockProvider::working());
    let service = common::service_with(TranslationProvider::MobileWeb, &[primary.clone(), fallback.clone()]);

    let outcome = service.translate("Good morning", &RequestContext::new()).await.unwrap();

    assert_eq!(outcome.status, TranslationStatus::Translated);
    assert_eq!(outcome.text.as_deref(), Some("[TRANSLATED] Good morning"));
    assert_eq!(primary.call_count(), 1);
    assert_eq!(fallback.call_count(), 1);
}

#[tokio::test]
async fn test_translate_withCloudActiveButNoKey_shouldFallThroughImmediately() {
    let missing_key = cloud(MockProvider::unavailable());
    let fallback = gtx(MockProvider::working());
    let service = common::service_with(TranslationProvider::CloudApi, &[missing_key.clone(), fallback.clone()]);

    let outcome = service.translate("Good evening", &RequestContext::new()).await.unwrap();

    assert_eq!(outcome.status, TranslationStatus::Translated);
    assert_eq!(fallback.call_count(), 1);
}

#[tokio::test]
async fn test_translate_withUnconfiguredOfflineEngine_shouldFallBackToWeb() {
    let fallback = gtx(MockProvider::working());
    let mut config = common::fast_config();
    config.translation.provider = TranslationProvider::Offline;
    let mut registry = ProviderRegistry::new();
    registry
        .register(OfflineEngine::new(None, Vec::new(), "ru", Duration::from_secs(1)))
        .register(fallback.clone());
    let service = TranslationService::with_registry(config, registry);

    let outcome = service.translate("Offline please", &RequestContext::new()).await.unwrap();

    assert_eq!(outcome.status, TranslationStatus::Translated);
    assert_eq!(fallback.call_count(), 1);
}

#[tokio::test]
async fn test_translate_withManyParagraphs_shouldSendBudgetedBatchesInOrder() {
    let backend = gtx(MockProvider::working());
    let service = common::service_with(TranslationProvider::WebGtx, &[backend.clone()]);

    let paragraphs: Vec<String> = (0..13).map(|i| format!("Paragraph {}", i)).collect();
    let input = paragraphs.join("\n\n");
    let outcome = service.translate(&input, &RequestContext::new()).await.unwrap();

    let batch_sizes: Vec<usize> = backend.calls().iter().map(Vec::len).collect();
    assert_eq!(batch_sizes, vec![6, 6, 1]);
    let expected: Vec<String> = paragraphs.iter().map(|p| format!("[TRANSLATED] {}", p)).collect();
    assert_eq!(outcome.text, Some(expected.join("\n\n")));
}

#[tokio::test]
async fn test_translate_withHugeUnpunctuatedParagraph_shouldHardSplitAndConcatenate() {
    let backend = gtx(MockProvider::rejecting_texts_over(1800));
    let service = common::service_with(TranslationProvider::WebGtx, &[backend.clone()]);

    let input = "x".repeat(5000);
    let outcome = service.translate(&input, &RequestContext::new()).await.unwrap();

    let calls = backend.calls();
    // Three rejected whole-chunk attempts, then one call per part
    assert_eq!(calls.len(), 6);
    let part_sizes: Vec<usize> = calls[3..].iter().map(|call| call[0].chars().count()).collect();
    assert_eq!(part_sizes, vec![1800, 1800, 1400]);

    let expected = format!(
        "[TRANSLATED] {}[TRANSLATED] {}[TRANSLATED] {}",
        "x".repeat(1800),
        "x".repeat(1800),
        "x".repeat(1400)
    );
    assert_eq!(outcome.status, TranslationStatus::Translated);
    assert_eq!(outcome.text, Some(expected));
}

#[tokio::test]
async fn test_translate_withOneUntranslatableParagraph_shouldReturnPartial() {
    let backend = gtx(MockProvider::rejecting_texts_over(10));
    let service = common::service_with(TranslationProvider::WebGtx, &[backend]);

    let outcome = service
        .translate("short\n\nthis one is too long for the backend", &RequestContext::new())
        .await
        .unwrap();

    assert_eq!(outcome.status, TranslationStatus::Partial);
    assert_eq!(
        outcome.text.as_deref(),
        Some("[TRANSLATED] short\n\nthis one is too long for the backend")
    );
}

#[tokio::test]
async fn test_translate_withFlakyBackend_shouldRecoverThroughRetries() {
    let backend = gtx(MockProvider::fail_first(2));
    let service = common::service_with(TranslationProvider::WebGtx, &[backend.clone()]);

    let outcome = service.translate("One\n\nTwo", &RequestContext::new()).await.unwrap();

    assert_eq!(outcome.status, TranslationStatus::Translated);
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn test_translate_withCancellationMidRequest_shouldReturnCancelled() {
    let backend = gtx(MockProvider::slow(5_000));
    let service = common::service_with(TranslationProvider::WebGtx, &[backend]);
    let ctx = RequestContext::new();

    let handle = ctx.cancellation().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let started = Instant::now();
    let result = service.translate("Please stop", &ctx).await;

    assert!(matches!(result, Err(TranslationError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_translate_withExpiredDeadline_shouldReturnOriginalText() {
    let backend = gtx(MockProvider::slow(2_000));
    let service = common::service_with(TranslationProvider::WebGtx, &[backend]);
    let ctx = RequestContext::new().with_timeout(Duration::from_millis(100));

    let input = "Too slow\n\nfor the deadline";
    let outcome = service.translate(input, &ctx).await.unwrap();

    assert_eq!(outcome.status, TranslationStatus::Original);
    assert_eq!(outcome.text.as_deref(), Some(input));
}

#[tokio::test]
async fn test_translate_withConcurrentRequests_shouldRunOneAtATime() {
    let backend = gtx(MockProvider::slow(150));
    let service = Arc::new(common::service_with(TranslationProvider::WebGtx, &[backend.clone()]));

    let started = Instant::now();
    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.translate("first", &RequestContext::new()).await })
    };
    let second = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.translate("second", &RequestContext::new()).await })
    };

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert!(first.is_translated() && second.is_translated());
    assert_eq!(backend.call_count(), 2);
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[test]
fn test_translate_fromSynchronousCaller_shouldCompleteOnBlockingRuntime() {
    let backend = gtx(MockProvider::working());
    let service = common::service_with(TranslationProvider::WebGtx, &[backend.clone()]);

    let outcome = tokio_test::block_on(service.translate("Hi there", &RequestContext::new())).unwrap();

    assert_eq!(outcome.text.as_deref(), Some("[TRANSLATED] Hi there"));
    assert_eq!(backend.call_count(), 1);
}
