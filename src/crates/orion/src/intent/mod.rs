//! Intent classification
//!
//! A message maps to exactly one [`Intent`]. The classifier walks an ordered
//! rule table built from a [`LanguagePack`](keywords::LanguagePack); the first
//! matching rule wins and `Fallback` always matches.

pub mod classifier;
pub mod keywords;

use serde::{Deserialize, Serialize};

use crate::chart::ChartSpec;

pub use classifier::{IntentClassifier, Matcher, Rule, RuleTable};
pub use keywords::LanguagePack;

/// Field-less tag of an [`Intent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Greeting,
    Weather,
    VoiceHint,
    ScrapeHint,
    TranslateHint,
    CalculateHint,
    ChartRequest,
    ChartFromNamedCsv,
    Fallback,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Greeting => "greeting",
            IntentKind::Weather => "weather",
            IntentKind::VoiceHint => "voice_hint",
            IntentKind::ScrapeHint => "scrape_hint",
            IntentKind::TranslateHint => "translate_hint",
            IntentKind::CalculateHint => "calculate_hint",
            IntentKind::ChartRequest => "chart_request",
            IntentKind::ChartFromNamedCsv => "chart_from_named_csv",
            IntentKind::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classified purpose of a message, with extracted parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Weather,
    VoiceHint,
    ScrapeHint,
    TranslateHint,
    CalculateHint,
    /// Chart the most recent CSV in the data directory
    ChartRequest { spec: ChartSpec },
    /// Chart a CSV named in the message; `file` is `None` when no name
    /// could be extracted
    ChartFromNamedCsv {
        file: Option<String>,
        spec: ChartSpec,
    },
    Fallback,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Greeting => IntentKind::Greeting,
            Intent::Weather => IntentKind::Weather,
            Intent::VoiceHint => IntentKind::VoiceHint,
            Intent::ScrapeHint => IntentKind::ScrapeHint,
            Intent::TranslateHint => IntentKind::TranslateHint,
            Intent::CalculateHint => IntentKind::CalculateHint,
            Intent::ChartRequest { .. } => IntentKind::ChartRequest,
            Intent::ChartFromNamedCsv { .. } => IntentKind::ChartFromNamedCsv,
            Intent::Fallback => IntentKind::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mirrors_variant() {
        let intent = Intent::ChartFromNamedCsv {
            file: Some("ventas.csv".into()),
            spec: ChartSpec::default(),
        };
        assert_eq!(intent.kind(), IntentKind::ChartFromNamedCsv);
        assert_eq!(Intent::Fallback.kind().to_string(), "fallback");
    }

    #[test]
    fn test_intent_serializes_tagged() {
        let json = serde_json::to_value(Intent::ChartRequest {
            spec: ChartSpec::default(),
        })
        .unwrap();
        assert_eq!(json["intent"], "chart_request");
        assert_eq!(json["spec"]["kind"], "bar");
    }
}
