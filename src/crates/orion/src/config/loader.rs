//! Configuration loader with layered sources
//!
//! Layers, later ones overriding earlier ones key by key:
//! 1. Default values
//! 2. User-level config: ~/.orion/orion.toml
//! 3. Project-level config: ./.orion/orion.toml
//! 4. An explicit file (`--config`)
//! 5. Environment overrides
//!
//! Missing user and project files are skipped. A file that exists but does
//! not parse is an error.

use std::path::{Path, PathBuf};

use tokio::fs;
use toml::Value;
use tooling::config::{get_env_bool, get_env_non_empty, get_env_parse};
use tracing::{debug, info};

use crate::config::schema::OrionConfig;
use crate::error::{OrionError, Result};

const CONFIG_DIR: &str = ".orion";
const CONFIG_FILE: &str = "orion.toml";

/// Configuration loader that handles user, project and explicit configs
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
    explicit_path: Option<PathBuf>,
    apply_env: bool,
}

impl ConfigLoader {
    /// Create a loader for the standard locations
    pub fn new() -> Self {
        Self {
            user_config_path: dirs::home_dir().map(|h| h.join(CONFIG_DIR).join(CONFIG_FILE)),
            project_config_path: std::env::current_dir()
                .ok()
                .map(|d| d.join(CONFIG_DIR).join(CONFIG_FILE)),
            explicit_path: None,
            apply_env: true,
        }
    }

    /// Create a loader reading only the given file, without environment overrides
    pub fn isolated(path: Option<PathBuf>) -> Self {
        Self {
            user_config_path: None,
            project_config_path: None,
            explicit_path: path,
            apply_env: false,
        }
    }

    /// Add an explicit file applied after the user and project files
    pub fn with_explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    /// Load and merge every layer
    pub async fn load(&self) -> Result<OrionConfig> {
        let mut merged = Value::Table(Default::default());

        for path in [&self.user_config_path, &self.project_config_path]
            .into_iter()
            .flatten()
        {
            match Self::read_layer(path).await? {
                Some(layer) => {
                    debug!(path = %path.display(), "Loaded config layer");
                    merge_values(&mut merged, layer);
                }
                None => debug!(path = %path.display(), "Config file not found, skipping"),
            }
        }

        if let Some(path) = &self.explicit_path {
            let layer = Self::read_layer(path).await?.ok_or_else(|| {
                OrionError::Config(format!("Config file not found: {}", path.display()))
            })?;
            debug!(path = %path.display(), "Loaded explicit config");
            merge_values(&mut merged, layer);
        }

        let mut config = merged
            .try_into::<OrionConfig>()
            .map_err(|e| OrionError::Config(format!("Invalid configuration: {}", e)))?;

        config.resolve_env_vars();
        if self.apply_env {
            apply_env_overrides(&mut config)?;
        }

        info!(model = %config.llm.model, language = %config.language.pack, "Configuration loaded");
        Ok(config)
    }

    async fn read_layer(path: &Path) -> Result<Option<Value>> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(None);
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            OrionError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let value: Value = toml::from_str(&content).map_err(|e| {
            OrionError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Ok(Some(value))
    }

    /// Get user config path
    pub fn user_config_path(&self) -> Option<&Path> {
        self.user_config_path.as_deref()
    }

    /// Get project config path
    pub fn project_config_path(&self) -> Option<&Path> {
        self.project_config_path.as_deref()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep-merge `overlay` into `base`; tables merge, everything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base), Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Apply `GEMINI_API_KEY` and `ORION_*` environment variables
pub fn apply_env_overrides(config: &mut OrionConfig) -> Result<()> {
    let env = |key: &str| get_env_non_empty(key).map_err(|e| OrionError::Config(e.to_string()));

    if let Some(key) = env("GEMINI_API_KEY")? {
        config.llm.api_key = Some(key);
    }
    if let Some(model) = env("ORION_MODEL")? {
        config.llm.model = model;
    }
    if let Some(dir) = env("ORION_DATA_DIR")? {
        config.chart.data_dir = PathBuf::from(dir);
    }
    if let Some(dir) = env("ORION_OUTPUT_DIR")? {
        config.chart.output_dir = PathBuf::from(dir);
    }
    if let Some(pack) = env("ORION_LANGUAGE")? {
        config.language.pack = pack;
        config.language.file = None;
    }
    if let Some(level) = env("ORION_LOG_LEVEL")? {
        config.logging.level = level;
    }
    if let Some(secs) = get_env_parse::<u64>("ORION_BACKOFF_SECS")
        .map_err(|e| OrionError::Config(e.to_string()))?
    {
        config.retry.backoff_secs = secs;
    }
    if let Some(attach) =
        get_env_bool("ORION_ATTACH_LAST_CHART").map_err(|e| OrionError::Config(e.to_string()))?
    {
        config.artifacts.attach_last_chart = attach;
    }
    Ok(())
}
