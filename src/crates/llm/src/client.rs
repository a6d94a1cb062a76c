//! The model client seam.
//!
//! Everything above this crate talks to a model through [`ModelClient`], so
//! the hosted backend can be swapped for a stub in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};

/// Author of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One earlier turn supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
}

impl HistoryTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// A single generation call: the new prompt plus optional prior turns.
///
/// History is input only. Nothing here is retained between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryTurn>) -> Self {
        self.history = history;
        self
    }
}

/// A text-generating model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Produce a reply to `request`. One call is one upstream request.
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;

    /// Model identifier used in logs.
    fn model_name(&self) -> &str;
}

/// Stand-in used when no model can be configured, e.g. a missing API key.
///
/// Every call fails with the configured reason, so the rest of the engine
/// keeps working and the fallback path reports the problem as text.
#[derive(Debug, Clone)]
pub struct UnavailableModel {
    model: String,
    reason: String,
}

impl UnavailableModel {
    pub fn new(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ModelClient for UnavailableModel {
    async fn generate(&self, _request: &GenerateRequest) -> Result<String> {
        Err(LlmError::ApiKeyNotFound(self.reason.clone()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
