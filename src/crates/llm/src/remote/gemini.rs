//! Google Gemini client implementation.
//!
//! Calls the `generateContent` REST method with the API key as a query
//! parameter.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::GeminiClient;
//! use llm::config::{RemoteLlmConfig, GEMINI_API_BASE};
//! use llm::{GenerateRequest, ModelClient};
//!
//! let config = RemoteLlmConfig::from_env("GEMINI_API_KEY", GEMINI_API_BASE, "gemini-2.5-flash")?;
//! let client = GeminiClient::new(config)?;
//! let reply = client.generate(&GenerateRequest::new("Hola")).await?;
//! ```

use crate::client::{GenerateRequest, ModelClient, Role};
use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tooling::logging::{sanitize_for_logging, timed};
use tracing::debug;

/// Google Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    config: RemoteLlmConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client with the given configuration.
    pub fn new(config: RemoteLlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::ApiKeyNotFound(
                "no API key configured for Gemini".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// History turns first, then the new prompt as the final user turn.
    fn build_contents(request: &GenerateRequest) -> Vec<GeminiMessage> {
        request
            .history
            .iter()
            .map(|turn| GeminiMessage {
                role: turn.role.as_str().to_string(),
                parts: vec![GeminiPart {
                    text: turn.text.clone(),
                }],
            })
            .chain(std::iter::once(GeminiMessage {
                role: Role::User.as_str().to_string(),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }))
            .collect()
    }

    async fn send(&self, request: &GenerateRequest) -> Result<String> {
        let body = GeminiRequest {
            contents: Self::build_contents(request),
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", &self.config.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let error_text = sanitize_for_logging(&error_text);
            debug!(status = status.as_u16(), "Gemini returned an error status");

            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationError(error_text),
                404 => LlmError::ModelNotFound(format!("{}: {}", self.config.model, error_text)),
                429 => LlmError::RateLimitExceeded(error_text),
                500..=599 => LlmError::ServiceUnavailable(format!("{}: {}", status, error_text)),
                _ => LlmError::ProviderError(format!("Gemini API error {}: {}", status, error_text)),
            });
        }

        let gemini_resp: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.without_url().to_string()))?;

        extract_text(gemini_resp)
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        timed("gemini.generate", self.send(request)).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Transport failures never carry the request URL, which holds the key.
fn map_transport_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout(err.without_url().to_string())
    } else {
        LlmError::HttpError(err.without_url())
    }
}

/// Concatenate the parts of the first candidate, trimmed.
fn extract_text(response: GeminiResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("response has no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(LlmError::InvalidResponse(format!(
            "empty candidate (finish reason: {})",
            reason
        )));
    }

    Ok(text.to_string())
}

// Gemini API types
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiMessage {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}
