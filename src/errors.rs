/*!
 * Error types for the captionmerge service.
 *
 * This module contains custom error types for the different layers of the
 * service, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while resolving a video identifier
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// The input is neither a known video URL nor a bare identifier
    #[error("Invalid YouTube URL or video ID: {0}")]
    InvalidInput(String),
}

/// Errors that can occur when fetching captions from the provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when sending the request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when the provider returned something we could not understand
    #[error("Failed to parse provider response: {0}")]
    ParseError(String),

    /// Error returned by the provider itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the provider
        message: String,
    },

    /// The provider answered with a captcha page
    #[error("Too many requests: the captions provider is rate limiting this client")]
    TooManyRequests,

    /// The video does not exist or is not playable
    #[error("The video is no longer available: {0}")]
    VideoUnavailable(String),

    /// The video has no caption tracks at all
    #[error("Subtitles are disabled for this video: {0}")]
    TranscriptsDisabled(String),

    /// The video has captions, just not in the configured language
    #[error("No transcript found for video {video_id} in language '{language}' (available: {available})")]
    NoTranscriptFound {
        /// Requested video identifier
        video_id: String,
        /// Configured caption language
        language: String,
        /// Comma separated language codes the video does offer
        available: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// The video identifier could not be resolved
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// Error from the captions provider
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// HTTP status code this error maps to at the service boundary
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Resolve(_) => 400,
            _ => 500,
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
