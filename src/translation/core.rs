/*!
 * Core translation service implementation.
 *
 * This module contains the main TranslationService struct, which runs one
 * request through the whole pipeline: trim, skip heuristic, segmentation,
 * chunking, batch translation and reassembly.
 */

use anyhow::Result;
use log::{debug, info, warn};
use std::fmt;
use tokio::sync::Mutex;

use crate::app_config::{Config, TranslationProvider};
use crate::errors::TranslationError;
use crate::language_utils;
use super::batch::{BatchTranslator, ProgressEvent};
use super::chunking::{ChunkBudget, make_chunks};
use super::document::{reassemble, segment_text};
use super::fallback::ProviderRegistry;
use super::request::{Interrupt, RequestContext};

/// How a request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationStatus {
    /// Input was empty or whitespace only
    NothingToTranslate,
    /// Input is already in the target script and was returned as is
    Skipped,
    /// Every paragraph was translated
    Translated,
    /// Some paragraphs kept their original text
    Partial,
    /// No paragraph could be translated; the original text is returned
    Original,
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NothingToTranslate => "nothing-to-translate",
            Self::Skipped => "skipped",
            Self::Translated => "translated",
            Self::Partial => "partial",
            Self::Original => "original",
        };
        write!(f, "{}", name)
    }
}

/// Result of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutcome {
    /// Text to display; `None` only when there was nothing to translate
    pub text: Option<String>,
    pub status: TranslationStatus,
}

impl TranslationOutcome {
    fn nothing_to_translate() -> Self {
        Self {
            text: None,
            status: TranslationStatus::NothingToTranslate,
        }
    }

    fn with_text(text: String, status: TranslationStatus) -> Self {
        Self {
            text: Some(text),
            status,
        }
    }

    /// Whether at least one paragraph came back from a backend
    pub fn is_translated(&self) -> bool {
        matches!(self.status, TranslationStatus::Translated | TranslationStatus::Partial)
    }
}

/// Translation pipeline bound to a configuration
///
/// Only one request runs at a time; concurrent callers wait for the
/// request guard in arrival order.
#[derive(Debug)]
pub struct TranslationService {
    /// Configuration for the service
    config: Config,
    /// ISO 639-1 target language
    target_language: String,
    /// Backend instances
    registry: ProviderRegistry,
    /// Serializes requests
    request_guard: Mutex<()>,
}

impl TranslationService {
    /// Create a service with the backends described by `config`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let registry = ProviderRegistry::from_config(&config)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a service over explicitly registered backends
    pub fn with_registry(config: Config, registry: ProviderRegistry) -> Self {
        let target_language = language_utils::normalize_to_part1(&config.target_language)
            .unwrap_or_else(|_| config.target_language.trim().to_lowercase());
        Self {
            config,
            target_language,
            registry,
            request_guard: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Translate `text` with the configured provider
    pub async fn translate(&self, text: &str, ctx: &RequestContext) -> Result<TranslationOutcome, TranslationError> {
        self.translate_with_provider(text, self.config.translation.provider, ctx, &|_: ProgressEvent| {})
            .await
    }

    /// Translate `text`, starting the fallback chain at `provider`
    ///
    /// # Arguments
    /// * `text` - Raw captured text
    /// * `provider` - Preferred backend
    /// * `ctx` - Deadline and cancellation of this request
    /// * `progress` - Receives progress events
    ///
    /// # Returns
    /// * `Result<TranslationOutcome, TranslationError>` - The text to display, or `Cancelled`
    pub async fn translate_with_provider(
        &self,
        text: &str,
        provider: TranslationProvider,
        ctx: &RequestContext,
        progress: &(dyn Fn(ProgressEvent) + Send + Sync),
    ) -> Result<TranslationOutcome, TranslationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("Nothing to translate");
            return Ok(TranslationOutcome::nothing_to_translate());
        }

        let _guard = match ctx.run(self.request_guard.lock()).await {
            Ok(guard) => guard,
            Err(Interrupt::Cancelled) => return Err(TranslationError::Cancelled),
            Err(Interrupt::DeadlineExceeded) => {
                warn!("Deadline passed while waiting for the previous request");
                return Ok(TranslationOutcome::with_text(trimmed.to_string(), TranslationStatus::Original));
            }
        };

        if language_utils::should_skip_for_target(trimmed, &self.target_language) {
            info!("Text is already in the target script, skipping translation");
            return Ok(TranslationOutcome::with_text(trimmed.to_string(), TranslationStatus::Skipped));
        }

        progress(ProgressEvent::Started);
        let common = &self.config.translation.common;
        let (segments, paragraphs) = segment_text(trimmed);
        let chunks = make_chunks(&paragraphs, ChunkBudget {
            max_chars: common.max_chars_per_chunk,
            max_paragraphs: common.max_paragraphs_per_chunk,
        });
        let chain = self.registry.chain_for(provider);
        debug!(
            "Translating {} paragraphs in {} chunks via {:?}",
            paragraphs.len(),
            chunks.len(),
            chain.kinds()
        );

        let mut batch = BatchTranslator::new(chain, common);
        let report = batch.translate_chunks(&chunks, ctx, progress).await;
        progress(ProgressEvent::Finished);

        if report.interrupt == Some(Interrupt::Cancelled) {
            info!("Translation cancelled");
            return Err(TranslationError::Cancelled);
        }

        let translatable = paragraphs.iter().filter(|p| p.is_translatable()).count();
        let translated = report.translations.len();
        let status = if translated == 0 {
            TranslationStatus::Original
        } else if translated < translatable {
            TranslationStatus::Partial
        } else {
            TranslationStatus::Translated
        };
        if status != TranslationStatus::Translated {
            warn!("{} of {} paragraphs translated", translated, translatable);
        }

        let output = reassemble(&segments, &paragraphs, &report.translations);
        Ok(TranslationOutcome::with_text(output, status))
    }
}
