//! Ordered, data-driven intent rules

use regex::Regex;
use tracing::{debug, warn};

use super::keywords::{contains_any, LanguagePack};
use super::{Intent, IntentKind};
use crate::chart::ChartSpec;

/// Condition a normalized message must satisfy for a rule to fire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Any of the keywords occurs as a substring
    AnyKeyword(Vec<String>),
    /// The marker occurs and so does any of the keywords
    MarkerAndAnyKeyword { marker: String, keywords: Vec<String> },
    /// Always matches
    Always,
}

impl Matcher {
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Matcher::AnyKeyword(keywords) => contains_any(normalized, keywords),
            Matcher::MarkerAndAnyKeyword { marker, keywords } => {
                !marker.is_empty()
                    && normalized.contains(marker.as_str())
                    && contains_any(normalized, keywords)
            }
            Matcher::Always => true,
        }
    }
}

/// One entry of the rule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub kind: IntentKind,
    pub matcher: Matcher,
}

/// Rules in priority order; the first match wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Build the standard priority list from a language pack
    ///
    /// greeting > weather > voice > scrape > translate > calculate >
    /// chart request > chart from named CSV > fallback
    pub fn from_pack(pack: &LanguagePack) -> Self {
        let k = &pack.keywords;
        let any = |kind, words: &Vec<String>| Rule {
            kind,
            matcher: Matcher::AnyKeyword(words.clone()),
        };

        Self {
            rules: vec![
                any(IntentKind::Greeting, &k.greeting),
                any(IntentKind::Weather, &k.weather),
                any(IntentKind::VoiceHint, &k.voice),
                any(IntentKind::ScrapeHint, &k.scrape),
                any(IntentKind::TranslateHint, &k.translate),
                any(IntentKind::CalculateHint, &k.calculate),
                any(IntentKind::ChartRequest, &k.chart),
                Rule {
                    kind: IntentKind::ChartFromNamedCsv,
                    matcher: Matcher::MarkerAndAnyKeyword {
                        marker: k.csv_marker.clone(),
                        keywords: k.named_chart.clone(),
                    },
                },
                Rule {
                    kind: IntentKind::Fallback,
                    matcher: Matcher::Always,
                },
            ],
        }
    }

    /// Kind of the first rule matching `normalized`
    pub fn select(&self, normalized: &str) -> IntentKind {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(normalized))
            .map(|rule| rule.kind)
            .unwrap_or(IntentKind::Fallback)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Maps raw text to an [`Intent`]. Total and side-effect free.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    pack: LanguagePack,
    table: RuleTable,
    csv_name: Option<Regex>,
}

impl IntentClassifier {
    pub fn new(pack: LanguagePack) -> Self {
        let table = RuleTable::from_pack(&pack);
        let pattern = format!(r"[\w\-.]+{}", regex::escape(&pack.keywords.csv_marker));
        let csv_name = match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(error = %e, "CSV name pattern rejected, named charts disabled");
                None
            }
        };

        Self {
            pack,
            table,
            csv_name,
        }
    }

    pub fn pack(&self) -> &LanguagePack {
        &self.pack
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn classify(&self, message: &str) -> Intent {
        let normalized = message.trim().to_lowercase();
        let kind = self.table.select(&normalized);
        debug!(intent = ?kind, "Classified message");

        match kind {
            IntentKind::Greeting => Intent::Greeting,
            IntentKind::Weather => Intent::Weather,
            IntentKind::VoiceHint => Intent::VoiceHint,
            IntentKind::ScrapeHint => Intent::ScrapeHint,
            IntentKind::TranslateHint => Intent::TranslateHint,
            IntentKind::CalculateHint => Intent::CalculateHint,
            IntentKind::ChartRequest => Intent::ChartRequest {
                spec: ChartSpec::parse(&normalized, &self.pack.keywords),
            },
            IntentKind::ChartFromNamedCsv => Intent::ChartFromNamedCsv {
                file: self.extract_csv_name(message),
                spec: ChartSpec::parse(&normalized, &self.pack.keywords),
            },
            IntentKind::Fallback => Intent::Fallback,
        }
    }

    /// First CSV-looking token of the original message, case preserved
    fn extract_csv_name(&self, message: &str) -> Option<String> {
        self.csv_name
            .as_ref()?
            .find(message)
            .map(|m| m.as_str().to_string())
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(LanguagePack::default())
    }
}
