/*!
 * Error types for the transon application.
 *
 * This module contains custom error types for the different layers of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when calling a translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The backend cannot be used at all (missing API key, missing executable)
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The backend returned a different number of strings than it was given
    #[error("Expected {expected} translations, got {actual}")]
    CountMismatch {
        /// Number of input strings
        expected: usize,
        /// Number of strings returned
        actual: usize,
    },

    /// The request or subprocess exceeded its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The offline engine exited unsuccessfully or could not be spawned
    #[error("Process failed: {0}")]
    ProcessFailed(String),
}

impl ProviderError {
    /// Whether this error means the backend was never attempted
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can end a translation request
///
/// Backend failures never reach the caller; they degrade the result instead.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The caller abandoned the request
    #[error("Translation cancelled")]
    Cancelled,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error in the configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),
}

impl AppError {
    /// Wrap a configuration failure, keeping its context chain
    pub fn config(error: anyhow::Error) -> Self {
        Self::Config(format!("{:#}", error))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
