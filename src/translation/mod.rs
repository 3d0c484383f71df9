/*!
 * Translation pipeline.
 *
 * This module contains the core functionality for turning a block of text
 * into its translation. It is split into several submodules:
 *
 * - `core`: The service that runs one request end to end
 * - `document`: Segmentation into paragraphs and separators, and reassembly
 * - `chunking`: Packing paragraphs into batches and splitting long ones
 * - `batch`: Retry, backoff and granularity degradation per chunk
 * - `fallback`: Ordered backend chains per active provider
 * - `backoff`: Retry delays and inter-chunk pauses
 * - `request`: Per-request deadline and cancellation
 */

// Re-export main types for easier usage
pub use self::batch::{BatchTranslator, ChunkOutcome, Granularity, ProgressEvent};
pub use self::core::{TranslationOutcome, TranslationService, TranslationStatus};
pub use self::document::{Paragraph, Segment, TranslationResult, reassemble, segment_text};
pub use self::chunking::{Chunk, ChunkBudget, make_chunks, split_long_paragraph};
pub use self::fallback::{ProviderChain, ProviderRegistry, fallback_chain};
pub use self::request::{CancellationHandle, Interrupt, RequestContext};

// Submodules
pub mod backoff;
pub mod batch;
pub mod chunking;
pub mod core;
pub mod document;
pub mod fallback;
pub mod request;
