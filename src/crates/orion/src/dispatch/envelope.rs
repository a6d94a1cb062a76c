//! Request and response types of the dispatch boundary

use std::path::PathBuf;

use llm::HistoryTurn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ErrorClass;
use crate::intent::IntentKind;

/// The only output of a dispatch: reply text plus an optional chart image
///
/// Serializes as `{"response": ..., "graphic": ...}`. `intent` and `class`
/// are omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "response")]
    pub text: String,

    #[serde(rename = "graphic")]
    pub artifact: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentKind>,

    /// Set only when the answer reports a failure or a required user action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<ErrorClass>,
}

impl ResponseEnvelope {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            artifact: None,
            intent: None,
            class: None,
        }
    }

    pub fn with_artifact(mut self, artifact: Option<PathBuf>) -> Self {
        self.artifact = artifact;
        self
    }

    pub fn with_intent(mut self, intent: IntentKind) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn with_class(mut self, class: ErrorClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn is_failure(&self) -> bool {
        self.class.is_some()
    }
}

/// One message to dispatch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub message: String,

    /// Scope for chart artifacts; `None` shares the nil session
    #[serde(default)]
    pub session: Option<Uuid>,

    /// Prior turns forwarded to the model; never stored
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

impl DispatchRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_session(mut self, session: Uuid) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session.unwrap_or(Uuid::nil())
    }
}
