//! Configuration schema for Orion

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use tooling::config::expand_env_placeholders;

/// Main Orion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OrionConfig {
    /// Hosted model used by the fallback path
    #[serde(default)]
    pub llm: LlmConfig,

    /// Quota retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Weather, search and translation endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// CSV discovery and chart rendering
    #[serde(default)]
    pub chart: ChartConfig,

    /// Chart artifact lifecycle
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Keyword and reply language
    #[serde(default)]
    pub language: LanguageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// LLM provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Only "gemini" is supported
    pub provider: String,

    /// Model name
    pub model: String,

    /// API key (supports `${VAR}` interpolation)
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: Some("${GEMINI_API_KEY}".to_string()),
            api_base: None,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The API key, if one is set and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Backoff before the single retry on a quota failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { backoff_secs: 45 }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

/// Outbound lookup providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Deadline for one lookup, in seconds
    pub timeout_secs: u64,
    pub weather: WeatherConfig,
    pub search: SearchConfig,
    pub translate: TranslateConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 3,
            weather: WeatherConfig::default(),
            search: SearchConfig::default(),
            translate: TranslateConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    /// Name shown in replies
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            city: "Bogotá".to_string(),
            latitude: 4.61,
            longitude: -74.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.duckduckgo.com/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    pub base_url: String,
    /// Target language when none is given
    pub default_target: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            base_url: "https://translate.googleapis.com/translate_a/single".to_string(),
            default_target: "en".to_string(),
        }
    }
}

/// Chart configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Directory scanned for CSV files
    pub data_dir: PathBuf,

    /// Directory chart images are written to
    pub output_dir: PathBuf,

    /// Canvas size in pixels
    pub width: u32,
    pub height: u32,

    /// TrueType font for chart text; common system fonts are tried when unset
    pub font_path: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            width: 800,
            height: 400,
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Attach the session's latest chart to model replies
    pub attach_last_chart: bool,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            attach_last_chart: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Built-in pack: "es" or "en"
    pub pack: String,

    /// TOML pack file, takes precedence over `pack`
    pub file: Option<PathBuf>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            pack: "es".to_string(),
            file: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive: "trace", "debug", "info", "warn", "error"
    pub level: String,

    /// Log format: "compact", "pretty"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl OrionConfig {
    /// Expand `${VAR}` placeholders in values that may carry secrets or URLs
    pub fn resolve_env_vars(&mut self) {
        if let Some(key) = &self.llm.api_key {
            let expanded = expand_env_placeholders(key);
            self.llm.api_key = (!expanded.trim().is_empty()).then_some(expanded);
        }
        if let Some(base) = &self.llm.api_base {
            self.llm.api_base = Some(expand_env_placeholders(base));
        }

        let p = &mut self.providers;
        p.weather.base_url = expand_env_placeholders(&p.weather.base_url);
        p.search.base_url = expand_env_placeholders(&p.search.base_url);
        p.translate.base_url = expand_env_placeholders(&p.translate.base_url);
    }
}
