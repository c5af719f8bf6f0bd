//! Error types for the language-model backend client.

use thiserror::Error;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when talking to the language-model backend.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Backend service unavailable (e.g., Ollama not running).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Configured model not installed on the backend.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Backend returned a non-success status.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Backend response could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether this error means the backend could not be reached at all,
    /// as opposed to answering with something unusable.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            LlmError::HttpError(_)
                | LlmError::ServiceUnavailable(_)
                | LlmError::ModelNotFound(_)
                | LlmError::ProviderError(_)
        )
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::InvalidResponse(err.to_string())
    }
}
