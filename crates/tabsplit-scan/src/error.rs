//! Scan errors.

use thiserror::Error;

/// Result type for scanning.
pub type ScanResult<T> = Result<T, ScanError>;

/// Everything that can go wrong between image bytes and a parsed receipt.
#[derive(Debug, Error)]
pub enum ScanError {
    /// No API key configured
    #[error("ANTHROPIC_API_KEY is not configured")]
    MissingApiKey,

    /// An environment variable held something unparseable
    #[error("Invalid configuration value for {0}")]
    InvalidConfig(String),

    /// Transport failure, including timeouts
    #[error("Vision request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer from the vision API
    #[error("Vision API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The reply carried no text block
    #[error("Vision API returned no text content")]
    EmptyResponse,

    /// The reply text held no parseable receipt JSON
    #[error("No valid JSON found in response: {0}")]
    InvalidJson(String),
}
