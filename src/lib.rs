/*!
 * # transon - selected-text translation pipeline
 *
 * A Rust library that translates an arbitrary block of captured text and
 * hands back a document with the same paragraph structure.
 *
 * ## Features
 *
 * - Lossless segmentation into paragraphs and blank-line separators
 * - Batching under a character and a paragraph budget
 * - Translate through several backends:
 *   - Public gtx endpoint
 *   - Cloud Translation API (API key)
 *   - Mobile web page scraping
 *   - Local offline engine subprocess
 * - Retry with capped exponential backoff and jitter
 * - Degradation from whole chunks to paragraphs to sentence parts
 * - Static fallback chains between backends
 * - Skips text that is already in the target script
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The pipeline:
 *   - `translation::core`: The request-level service
 *   - `translation::document`: Segmentation and reassembly
 *   - `translation::chunking`: Chunking and long-paragraph splitting
 *   - `translation::batch`: Retry and degradation
 *   - `translation::fallback`: Backend chains
 * - `language_utils`: ISO language codes and the skip heuristic
 * - `providers`: Backend clients:
 *   - `providers::web_gtx`: gtx JSON endpoint
 *   - `providers::cloud`: Cloud Translation API
 *   - `providers::mobile_web`: Mobile page scraper
 *   - `providers::offline`: Offline engine subprocess
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod translation;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::{Config, TranslationProvider};
pub use translation::{
    CancellationHandle, ProgressEvent, RequestContext, TranslationOutcome, TranslationService,
    TranslationStatus,
};
pub use language_utils::{get_language_name, normalize_to_part1, should_skip_translation};
pub use errors::{AppError, ProviderError, TranslationError};
