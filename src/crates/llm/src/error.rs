//! Error types for the model client.

use thiserror::Error;
use tooling::async_utils::retry::is_rate_limit_message;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when calling a hosted model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize/deserialize data.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// API authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// API key missing from configuration and environment.
    #[error("API key not found: {0}")]
    ApiKeyNotFound(String),

    /// Model not found or unavailable.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Upstream returned a 5xx status.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit or quota exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid response from provider.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// General provider error.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Whether this failure is a quota signal worth one delayed retry.
    ///
    /// Besides the typed variant, any error whose text mentions `429` or
    /// `quota` counts, since some upstream failures only say so in the body.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimitExceeded(_)) || is_rate_limit_message(&self.to_string())
    }

    /// Check if this error is due to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            LlmError::AuthenticationError(_) | LlmError::ApiKeyNotFound(_)
        )
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_variant() {
        assert!(LlmError::RateLimitExceeded("slow down".into()).is_rate_limited());
    }

    #[test]
    fn test_rate_limit_from_text() {
        let err = LlmError::ProviderError("Gemini API error 400: Quota exceeded".into());
        assert!(err.is_rate_limited());

        let err = LlmError::ProviderError("status 429".into());
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_other_errors_not_rate_limited() {
        assert!(!LlmError::AuthenticationError("bad key".into()).is_rate_limited());
        assert!(!LlmError::ServiceUnavailable("503".into()).is_rate_limited());
        assert!(LlmError::ApiKeyNotFound("GEMINI_API_KEY".into()).is_auth_error());
    }
}
