//! Configuration management for Orion
//!
//! Supports layered configuration:
//! - User-level: ~/.orion/orion.toml
//! - Project-level: ./.orion/orion.toml
//! - An explicit file passed on the command line
//! - `GEMINI_API_KEY` and `ORION_*` environment variables
//!
//! Later layers override earlier ones.

mod loader;
mod schema;

pub use loader::{apply_env_overrides, ConfigLoader};
pub use schema::{
    ArtifactsConfig, ChartConfig, LanguageConfig, LlmConfig, LoggingConfig, OrionConfig,
    ProvidersConfig, RetryConfig, SearchConfig, TranslateConfig, WeatherConfig,
};

use std::path::PathBuf;

use crate::error::Result;

/// Held by unit tests that set or remove process environment variables
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Load configuration from every layer, with `explicit` applied last among files
pub async fn load_config(explicit: Option<PathBuf>) -> Result<OrionConfig> {
    ConfigLoader::new().with_explicit(explicit).load().await
}
