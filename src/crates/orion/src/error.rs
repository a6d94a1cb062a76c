//! Error types for Orion
//!
//! Configuration and host errors convert into [`OrionError`] with `?`.
//! Dispatch failures never surface as errors: the engine turns every one
//! into envelope text tagged with an [`ErrorClass`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Orion operations
pub type Result<T> = std::result::Result<T, OrionError>;

/// Main error type for Orion operations
#[derive(Debug, Error)]
pub enum OrionError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Language pack could not be loaded
    #[error("Language pack error: {0}")]
    LanguagePack(String),

    /// Model client error
    #[error("LLM error: {0}")]
    Llm(#[from] llm::LlmError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Category of a failed answer, carried on the response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Nothing failed upstream; the answer is a notice for the user
    UserFacingInformational,
    /// An external service could not be reached or answered badly
    UpstreamUnavailable,
    /// The dataset or a requested column was unusable
    DataError,
    /// The model kept reporting quota exhaustion
    RateLimited,
    /// Input refused before any evaluation
    InputRejected,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::UserFacingInformational => "user_facing_informational",
            ErrorClass::UpstreamUnavailable => "upstream_unavailable",
            ErrorClass::DataError => "data_error",
            ErrorClass::RateLimited => "rate_limited",
            ErrorClass::InputRejected => "input_rejected",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
