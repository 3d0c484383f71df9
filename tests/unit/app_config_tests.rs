/*!
 * Tests for configuration loading, saving and validation
 */

use anyhow::Result;
use transon::app_config::{Config, LogLevel, TranslationProvider};
use crate::common;

#[test]
fn test_config_save_withCustomValues_shouldLoadBackIdentically() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.target_language = "uk".to_string();
    config.translation.provider = TranslationProvider::CloudApi;
    config.translation.common.max_paragraphs_per_chunk = 4;
    config.translation.provider_config_mut(TranslationProvider::Offline).binary_path = "/usr/local/bin/engine".to_string();
    config.log_level = LogLevel::Debug;
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded.target_language, "uk");
    assert_eq!(loaded.translation.provider, TranslationProvider::CloudApi);
    assert_eq!(loaded.translation.common.max_paragraphs_per_chunk, 4);
    assert_eq!(loaded.translation.get_binary_path().as_deref(), Some("/usr/local/bin/engine"));
    assert_eq!(loaded.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("nested").join("conf.json");

    let config = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(config.target_language, "ru");
    assert_eq!(config.translation.provider, TranslationProvider::WebGtx);
    assert_eq!(config.translation.available_providers.len(), 4);
    Ok(())
}

#[test]
fn test_from_file_withPartialJson_shouldFillDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{"target_language": "be", "translation": {"provider": "mobile-web"}}"#,
    )?;

    let config = Config::from_file(&path)?;
    assert_eq!(config.target_language, "be");
    assert_eq!(config.translation.provider, TranslationProvider::MobileWeb);
    assert_eq!(config.translation.common.max_chars_per_chunk, 1800);
    assert_eq!(config.translation.common.chunk_delay_min_ms, 300);
    assert_eq!(config.translation.common.chunk_delay_max_ms, 500);
    config.validate()?;
    Ok(())
}

#[test]
fn test_from_file_withInvalidJson_shouldReportPath() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "broken.json", "{ not json")?;

    let error = Config::from_file(&path).unwrap_err();
    assert!(format!("{:#}", error).contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_validate_withUnknownLanguage_shouldFail() {
    let mut config = Config::default();
    config.target_language = "zz".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withUnknownProviderEntry_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{"translation": {"available_providers": [{"type": "deepl"}]}}"#,
    )?;
    let config = Config::from_file(&path)?;
    assert!(config.validate().is_err());
    Ok(())
}

#[test]
fn test_provider_serialization_shouldUseKebabCase() -> Result<()> {
    let json = serde_json::to_string(&TranslationProvider::CloudApi)?;
    assert_eq!(json, "\"cloud-api\"");
    let parsed: TranslationProvider = serde_json::from_str("\"offline\"")?;
    assert_eq!(parsed, TranslationProvider::Offline);
    Ok(())
}

#[test]
fn test_provider_display_shouldMatchCommandLineName() {
    for provider in TranslationProvider::ALL {
        let parsed: TranslationProvider = provider.to_string().parse().unwrap();
        assert_eq!(parsed, provider);
    }
}
