use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::translation::backoff::{ChunkDelay, RetryPolicy};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (ISO 639-1)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend identity
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TranslationProvider {
    // @provider: Public gtx JSON endpoint
    #[default]
    WebGtx,
    // @provider: Authenticated Cloud Translation API
    CloudApi,
    // @provider: Mobile web page scraping
    MobileWeb,
    // @provider: Local offline engine subprocess
    Offline,
}

impl TranslationProvider {
    /// All providers in declaration order
    pub const ALL: [TranslationProvider; 4] = [
        Self::WebGtx,
        Self::CloudApi,
        Self::MobileWeb,
        Self::Offline,
    ];

    // @returns: Human readable provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::WebGtx => "Google Web (gtx)",
            Self::CloudApi => "Google Cloud API",
            Self::MobileWeb => "Google Mobile Web",
            Self::Offline => "Offline engine",
        }
    }

    // @returns: Identifier used in config files and on the command line
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::WebGtx => "web-gtx".to_string(),
            Self::CloudApi => "cloud-api".to_string(),
            Self::MobileWeb => "mobile-web".to_string(),
            Self::Offline => "offline".to_string(),
        }
    }

}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "web-gtx" | "gtx" | "webgtx" => Ok(Self::WebGtx),
            "cloud-api" | "cloud" | "cloudapi" => Ok(Self::CloudApi),
            "mobile-web" | "mobile" | "mobileweb" => Ok(Self::MobileWeb),
            "offline" | "offline-engine" => Ok(Self::Offline),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Environment variables consulted for the Cloud API key, in priority order
pub const API_KEY_ENV_VARS: [&str; 3] = [
    "GOOGLE_CLOUD_TRANSLATE_API_KEY",
    "GOOGLE_TRANSLATE_API_KEY",
    "GOOGLE_API_KEY",
];

/// Per-backend configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: API key (cloud-api only)
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Executable path (offline only)
    #[serde(default = "String::new")]
    pub binary_path: String,

    // @field: Extra executable arguments (offline only)
    #[serde(default)]
    pub args: Vec<String>,

    // @field: Timeout seconds; provider default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        let (endpoint, timeout_secs) = match provider_type {
            TranslationProvider::WebGtx => (default_web_gtx_endpoint(), default_timeout_secs()),
            TranslationProvider::CloudApi => (default_cloud_api_endpoint(), default_timeout_secs()),
            TranslationProvider::MobileWeb => (default_mobile_web_endpoint(), default_timeout_secs()),
            TranslationProvider::Offline => (String::new(), default_offline_timeout_secs()),
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            api_key: String::new(),
            endpoint,
            binary_path: String::new(),
            args: Vec::new(),
            timeout_secs: Some(timeout_secs),
        }
    }

    /// Timeout as a Duration, never zero
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or_else(default_timeout_secs).max(1))
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Pipeline settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Character budget of one chunk
    #[serde(default = "default_max_chars_per_chunk")]
    pub max_chars_per_chunk: usize,

    /// Paragraph budget of one chunk
    #[serde(default = "default_max_paragraphs_per_chunk")]
    pub max_paragraphs_per_chunk: usize,

    /// Total attempts per unit of work (chunk, paragraph or part)
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_base_ms")]
    pub retry_backoff_base_ms: u64,

    /// Upper bound of the exponential part of the backoff
    #[serde(default = "default_retry_backoff_cap_ms")]
    pub retry_backoff_cap_ms: u64,

    /// Lower bound of the random jitter added to every backoff
    #[serde(default = "default_retry_jitter_min_ms")]
    pub retry_jitter_min_ms: u64,

    /// Upper bound of the random jitter added to every backoff
    #[serde(default = "default_retry_jitter_max_ms")]
    pub retry_jitter_max_ms: u64,

    /// Lower bound of the pause between two chunks
    #[serde(default = "default_chunk_delay_min_ms")]
    pub chunk_delay_min_ms: u64,

    /// Upper bound of the pause between two chunks
    #[serde(default = "default_chunk_delay_max_ms")]
    pub chunk_delay_max_ms: u64,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            max_chars_per_chunk: default_max_chars_per_chunk(),
            max_paragraphs_per_chunk: default_max_paragraphs_per_chunk(),
            retry_count: default_retry_count(),
            retry_backoff_base_ms: default_retry_backoff_base_ms(),
            retry_backoff_cap_ms: default_retry_backoff_cap_ms(),
            retry_jitter_min_ms: default_retry_jitter_min_ms(),
            retry_jitter_max_ms: default_retry_jitter_max_ms(),
            chunk_delay_min_ms: default_chunk_delay_min_ms(),
            chunk_delay_max_ms: default_chunk_delay_max_ms(),
        }
    }
}

impl TranslationCommonConfig {
    /// Settings with every delay set to zero, for tests and benchmarks
    pub fn without_delays() -> Self {
        Self {
            retry_backoff_base_ms: 0,
            retry_backoff_cap_ms: 0,
            retry_jitter_min_ms: 0,
            retry_jitter_max_ms: 0,
            chunk_delay_min_ms: 0,
            chunk_delay_max_ms: 0,
            ..Self::default()
        }
    }

    /// Retry/backoff policy described by these settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry_count.max(1),
            base: Duration::from_millis(self.retry_backoff_base_ms),
            cap: Duration::from_millis(self.retry_backoff_cap_ms),
            jitter_min: Duration::from_millis(self.retry_jitter_min_ms),
            jitter_max: Duration::from_millis(self.retry_jitter_max_ms),
        }
    }

    /// Inter-chunk delay range described by these settings
    pub fn chunk_delay(&self) -> ChunkDelay {
        ChunkDelay {
            min: Duration::from_millis(self.chunk_delay_min_ms),
            max: Duration::from_millis(self.chunk_delay_max_ms),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the log facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "ru".to_string()
}

fn default_timeout_secs() -> u64 {
    12
}

fn default_offline_timeout_secs() -> u64 {
    60
}

fn default_max_chars_per_chunk() -> usize {
    1800
}

fn default_max_paragraphs_per_chunk() -> usize {
    6
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_base_ms() -> u64 {
    350
}

fn default_retry_backoff_cap_ms() -> u64 {
    1600
}

fn default_retry_jitter_min_ms() -> u64 {
    80
}

fn default_retry_jitter_max_ms() -> u64 {
    200
}

fn default_chunk_delay_min_ms() -> u64 {
    300
}

fn default_chunk_delay_max_ms() -> u64 {
    500
}

fn default_web_gtx_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_cloud_api_endpoint() -> String {
    "https://translation.googleapis.com/language/translate/v2".to_string()
}

fn default_mobile_web_endpoint() -> String {
    "https://translate.google.com/m".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.target_language)?;

        let common = &self.translation.common;
        if common.max_chars_per_chunk == 0 {
            return Err(anyhow!("max_chars_per_chunk must be greater than zero"));
        }
        if common.max_paragraphs_per_chunk == 0 {
            return Err(anyhow!("max_paragraphs_per_chunk must be greater than zero"));
        }
        if common.retry_count == 0 {
            return Err(anyhow!("retry_count must be at least 1"));
        }
        if common.retry_jitter_min_ms > common.retry_jitter_max_ms {
            return Err(anyhow!("retry_jitter_min_ms must not exceed retry_jitter_max_ms"));
        }
        if common.chunk_delay_min_ms > common.chunk_delay_max_ms {
            return Err(anyhow!("chunk_delay_min_ms must not exceed chunk_delay_max_ms"));
        }

        for provider_config in &self.translation.available_providers {
            provider_config.provider_type.parse::<TranslationProvider>()
                .context(format!("Unknown provider in config: {}", provider_config.provider_type))?;
        }

        // Missing prerequisites only make the backend unavailable; the fallback chain covers it
        match self.translation.provider {
            TranslationProvider::CloudApi if self.translation.get_api_key().is_none() => {
                warn!("No Cloud API key configured; requests will fall back to the web endpoints");
            }
            TranslationProvider::Offline if self.translation.get_binary_path().is_none() => {
                warn!("No offline engine binary configured; requests will fall back to the web endpoints");
            }
            _ => {}
        }

        Ok(())
    }

    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .context(format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load the configuration, writing a default one when the file does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context(format!("Failed to create config directory: {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)
            .context(format!("Failed to create config file: {}", path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Default config location: `<config dir>/transon/conf.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("transon")
            .join("conf.json")
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        self.available_providers.iter()
            .find(|p| p.provider_type.parse::<TranslationProvider>().ok() == Some(*provider_type))
    }

    /// Mutable access to a provider configuration, inserting defaults when absent
    pub fn provider_config_mut(&mut self, provider_type: TranslationProvider) -> &mut ProviderConfig {
        let position = self.available_providers.iter()
            .position(|p| p.provider_type.parse::<TranslationProvider>().ok() == Some(provider_type));
        match position {
            Some(position) => &mut self.available_providers[position],
            None => {
                self.available_providers.push(ProviderConfig::new(provider_type));
                let last = self.available_providers.len() - 1;
                &mut self.available_providers[last]
            }
        }
    }

    /// Resolved configuration for a provider, defaults filled in
    pub fn resolved_provider_config(&self, provider_type: TranslationProvider) -> ProviderConfig {
        let mut resolved = self.get_provider_config(&provider_type)
            .cloned()
            .unwrap_or_else(|| ProviderConfig::new(provider_type));
        let defaults = ProviderConfig::new(provider_type);
        if resolved.endpoint.is_empty() {
            resolved.endpoint = defaults.endpoint;
        }
        if resolved.timeout_secs.is_none() {
            resolved.timeout_secs = defaults.timeout_secs;
        }
        resolved
    }

    /// Get the Cloud API key, environment variables taking precedence
    pub fn get_api_key(&self) -> Option<String> {
        self.get_api_key_with(|name| std::env::var(name).ok())
    }

    /// Get the Cloud API key using a custom environment lookup
    pub fn get_api_key_with<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = API_KEY_ENV_VARS.iter()
            .filter_map(|name| env(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty());
        if from_env.is_some() {
            return from_env;
        }

        self.get_provider_config(&TranslationProvider::CloudApi)
            .map(|p| p.api_key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Get the offline engine executable path, if configured
    pub fn get_binary_path(&self) -> Option<String> {
        self.get_provider_config(&TranslationProvider::Offline)
            .map(|p| p.binary_path.trim().to_string())
            .filter(|path| !path.is_empty())
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: TranslationProvider::ALL.iter()
                .map(|provider| ProviderConfig::new(*provider))
                .collect(),
            common: TranslationCommonConfig::default(),
        }
    }
}
