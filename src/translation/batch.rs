/*!
 * Batch translation processing.
 *
 * Chunks are translated strictly one after another. Each unit of work goes
 * through the fallback chain with retry and backoff; when a whole chunk keeps
 * failing, its paragraphs are retried one by one, and paragraphs over the
 * character budget are translated as sentence-bounded parts. Nothing here
 * fails the request: untranslated paragraphs are simply left out of the
 * result and keep their original text.
 */

use log::{debug, info, warn};
use std::fmt;

use crate::app_config::TranslationCommonConfig;
use super::backoff::{ChunkDelay, JitterSource, RandomJitter, RetryPolicy};
use super::chunking::{Chunk, split_long_paragraph};
use super::document::{Paragraph, TranslationResult};
use super::fallback::{ChainFailure, ProviderChain};
use super::request::{Interrupt, RequestContext};

/// Level at which a unit of work is sent to the backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// All paragraphs of a chunk in one call
    Chunk,
    /// A single paragraph
    Paragraph,
    /// One sentence-bounded part of an oversized paragraph
    Sentence,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chunk => write!(f, "chunk"),
            Self::Paragraph => write!(f, "paragraph"),
            Self::Sentence => write!(f, "sentence part"),
        }
    }
}

/// Progress notifications of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Work is about to start
    Started,
    /// `completed` of `total` chunks are done
    ChunkCompleted { completed: usize, total: usize },
    /// The request finished, whatever the outcome
    Finished,
}

/// How one chunk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The whole chunk was translated in one call
    Translated,
    /// Translated paragraph by paragraph; `translated` of `total` succeeded
    Degraded { translated: usize, total: usize },
    /// No paragraph of the chunk could be translated
    Failed,
}

/// Everything gathered over a run of chunks
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Translations collected so far
    pub translations: TranslationResult,
    /// One outcome per chunk that ran to completion
    pub outcomes: Vec<ChunkOutcome>,
    /// Set when the run stopped early
    pub interrupt: Option<Interrupt>,
}

/// Sequential translator of chunks
pub struct BatchTranslator {
    chain: ProviderChain,
    retry: RetryPolicy,
    chunk_delay: ChunkDelay,
    max_chars: usize,
    jitter: Box<dyn JitterSource>,
}

impl fmt::Debug for BatchTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchTranslator")
            .field("chain", &self.chain.kinds())
            .field("retry", &self.retry)
            .field("chunk_delay", &self.chunk_delay)
            .field("max_chars", &self.max_chars)
            .finish()
    }
}

impl BatchTranslator {
    /// Create a batch translator using the pipeline settings
    pub fn new(chain: ProviderChain, common: &TranslationCommonConfig) -> Self {
        Self {
            chain,
            retry: common.retry_policy(),
            chunk_delay: common.chunk_delay(),
            max_chars: common.max_chars_per_chunk.max(1),
            jitter: Box::new(RandomJitter),
        }
    }

    /// Replace the random jitter source
    pub fn with_jitter(mut self, jitter: Box<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_chunk_delay(mut self, chunk_delay: ChunkDelay) -> Self {
        self.chunk_delay = chunk_delay;
        self
    }

    /// Send `texts` through the chain, retrying with backoff.
    ///
    /// Returns `Ok(None)` once every attempt failed, and `Err` only when the
    /// request was interrupted.
    pub async fn attempt_with_retry(
        &mut self,
        texts: &[String],
        granularity: Granularity,
        ctx: &RequestContext,
    ) -> Result<Option<Vec<String>>, Interrupt> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("Translating {} ({} strings), attempt {}/{}", granularity, texts.len(), attempt, self.retry.max_retries);

            match self.chain.translate(texts, ctx).await {
                Ok(translated) => return Ok(Some(translated)),
                Err(ChainFailure::Interrupted(interrupt)) => return Err(interrupt),
                Err(ChainFailure::Exhausted(e)) => {
                    if !self.retry.should_retry(attempt) {
                        warn!("Giving up on {} after {} attempts: {}", granularity, attempt, e);
                        return Ok(None);
                    }
                    let delay = self.retry.delay_for_attempt(attempt, &mut *self.jitter);
                    debug!("Attempt {} failed ({}), retrying in {:?}", attempt, e, delay);
                    ctx.sleep(delay).await?;
                }
            }
        }
    }

    /// Translate one paragraph on its own, in sentence parts if it is over budget
    async fn translate_paragraph(&mut self, paragraph: &Paragraph, ctx: &RequestContext) -> Result<Option<String>, Interrupt> {
        let parts = split_long_paragraph(&paragraph.text, self.max_chars);
        if parts.len() == 1 {
            let translated = self.attempt_with_retry(&parts, Granularity::Paragraph, ctx).await?;
            return Ok(translated.and_then(|texts| texts.into_iter().next()));
        }

        debug!("Paragraph {} split into {} parts", paragraph.index, parts.len());
        let mut joined = String::new();
        for part in parts {
            let translated = self.attempt_with_retry(std::slice::from_ref(&part), Granularity::Sentence, ctx).await?;
            match translated.and_then(|texts| texts.into_iter().next()) {
                Some(text) => joined.push_str(&text),
                None => {
                    warn!("Paragraph {} left untranslated: a part could not be translated", paragraph.index);
                    return Ok(None);
                }
            }
        }
        Ok(Some(joined))
    }

    /// Translate one chunk into `result`, degrading granularity on failure
    pub async fn translate_chunk(
        &mut self,
        chunk: &Chunk,
        ctx: &RequestContext,
        result: &mut TranslationResult,
    ) -> Result<ChunkOutcome, Interrupt> {
        let texts = chunk.texts();
        if let Some(translated) = self.attempt_with_retry(&texts, Granularity::Chunk, ctx).await? {
            for (paragraph, text) in chunk.paragraphs().iter().zip(translated) {
                result.insert(paragraph.index, text);
            }
            return Ok(ChunkOutcome::Translated);
        }

        warn!("Chunk of {} paragraphs failed, translating paragraphs individually", chunk.len());
        let mut translated_count = 0;
        for paragraph in chunk.paragraphs() {
            if let Some(text) = self.translate_paragraph(paragraph, ctx).await? {
                result.insert(paragraph.index, text);
                translated_count += 1;
            }
        }

        if translated_count == 0 {
            Ok(ChunkOutcome::Failed)
        } else {
            Ok(ChunkOutcome::Degraded {
                translated: translated_count,
                total: chunk.len(),
            })
        }
    }

    /// Translate every chunk in order, pausing between chunks
    pub async fn translate_chunks(
        &mut self,
        chunks: &[Chunk],
        ctx: &RequestContext,
        progress: &(dyn Fn(ProgressEvent) + Send + Sync),
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let total = chunks.len();

        for (position, chunk) in chunks.iter().enumerate() {
            if position > 0 {
                let delay = self.chunk_delay.pick(&mut *self.jitter);
                if let Err(interrupt) = ctx.sleep(delay).await {
                    report.interrupt = Some(interrupt);
                    break;
                }
            }

            match self.translate_chunk(chunk, ctx, &mut report.translations).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(interrupt) => {
                    report.interrupt = Some(interrupt);
                    break;
                }
            }
            progress(ProgressEvent::ChunkCompleted {
                completed: position + 1,
                total,
            });
        }

        if let Some(interrupt) = report.interrupt {
            info!("Stopped after {}/{} chunks: {:?}", report.outcomes.len(), total, interrupt);
        }
        report
    }
}
