/*!
 * Tests for error types and conversions
 */

use transon::errors::{AppError, ProviderError, TranslationError};

#[test]
fn test_provider_error_display_withApiError_shouldIncludeStatus() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too Many Requests".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 429 - Too Many Requests");
}

#[test]
fn test_is_unavailable_withEachVariant_shouldOnlyMatchUnavailable() {
    assert!(ProviderError::Unavailable("no key".to_string()).is_unavailable());
    assert!(!ProviderError::Timeout("slow".to_string()).is_unavailable());
    assert!(!ProviderError::CountMismatch { expected: 2, actual: 1 }.is_unavailable());
}

#[test]
fn test_app_error_fromTranslationError_shouldWrap() {
    let error: AppError = TranslationError::Cancelled.into();
    assert!(matches!(error, AppError::Translation(TranslationError::Cancelled)));
    assert_eq!(error.to_string(), "Translation error: Translation cancelled");
}

#[test]
fn test_app_error_fromIoError_shouldBecomeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(_)));
}

#[test]
fn test_app_error_config_withContextChain_shouldKeepEveryCause() {
    let error = anyhow::anyhow!("Target language cannot be empty").context("Configuration validation failed");
    let error = AppError::config(error);
    assert!(matches!(error, AppError::Config(_)));
    assert_eq!(
        error.to_string(),
        "Config error: Configuration validation failed: Target language cannot be empty"
    );
}
