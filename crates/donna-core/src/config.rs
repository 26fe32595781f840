use crate::error::DonnaError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Donna configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub donna: DonnaConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// General agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonnaConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DonnaConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

/// Oracle (language model) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// OpenAI-compatible endpoint base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key; falls back to the `OPENAI_API_KEY` env var when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Temperature for structured parsing calls (kept low for stable JSON).
    #[serde(default = "default_parse_temperature")]
    pub parse_temperature: f32,
    /// Temperature for user-facing phrasing calls.
    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            parse_temperature: default_parse_temperature(),
            chat_temperature: default_chat_temperature(),
        }
    }
}

impl OracleConfig {
    /// Resolve the effective API key (config value, else environment).
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

/// Task store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// How many recent conversation summaries to inject as oracle context.
    #[serde(default = "default_context_summaries")]
    pub context_summaries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            context_summaries: default_context_summaries(),
        }
    }
}

/// Load configuration from a toml file, falling back to defaults when the
/// file does not exist.
pub fn load(path: &str) -> Result<Config, DonnaError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!("Config file not found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| DonnaError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| DonnaError::Config(format!("failed to parse config: {e}")))?;

    Ok(config)
}

fn default_name() -> String {
    "Donna".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_parse_temperature() -> f32 {
    0.3
}

fn default_chat_temperature() -> f32 {
    0.7
}

fn default_db_path() -> String {
    "donna.db".to_string()
}

fn default_context_summaries() -> usize {
    3
}
