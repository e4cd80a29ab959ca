//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from the configuration file (~/.config/chatdeck/config.toml).

use chatdeck_core::paste::PasteClassifier;
use chatdeck_core::prompt::PromptGroup;
use chatdeck_core::{ChatDeckError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::paths::ChatDeckPaths;

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "CHATDECK_API_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Logging settings; `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn,chatdeck=info".to_string(),
        }
    }
}

/// A saved prompt as written in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    pub id: String,
    pub name: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<PromptConfig> for PromptGroup {
    fn from(config: PromptConfig) -> Self {
        PromptGroup {
            id: config.id,
            name: config.name,
            prompt_text: config.text,
            description: config.description,
        }
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatDeckConfig {
    pub api: ApiConfig,
    pub paste: PasteClassifier,
    pub log: LogConfig,
    #[serde(rename = "prompt", skip_serializing_if = "Vec::is_empty")]
    pub prompts: Vec<PromptConfig>,
}

impl ChatDeckConfig {
    /// Parses TOML text; blank text yields the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ChatDeckError::config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.paste.char_threshold == 0 || self.paste.line_threshold == 0 {
            return Err(ChatDeckError::config("paste thresholds must be greater than zero"));
        }
        Ok(())
    }

    pub fn prompt_groups(&self) -> Vec<PromptGroup> {
        self.prompts.iter().cloned().map(PromptGroup::from).collect()
    }

    fn apply_env_overrides(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            tracing::info!("[Config] Using {} from environment: {}", API_URL_ENV, url);
            self.api.base_url = url;
        }
    }
}

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit config path; `None` means the platform default.
    path: Option<PathBuf>,
    config: Arc<RwLock<Option<ChatDeckConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the default `~/.config/chatdeck/config.toml`.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading the given file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(ChatDeckPaths::config_file()?),
        }
    }

    /// Gets the configuration, loading it from file on first access.
    pub fn get_config(&self) -> Result<ChatDeckConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let mut loaded = Self::load_from_path(&self.config_path()?)?;
        loaded.apply_env_overrides(std::env::var(API_URL_ENV).ok());

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    /// Loads a config file; a missing or empty file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<ChatDeckConfig> {
        if !path.exists() {
            tracing::debug!("[Config] {} not found, using defaults", path.display());
            return Ok(ChatDeckConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        ChatDeckConfig::from_toml_str(&content).map_err(|e| {
            tracing::error!("[Config] Failed to load {}: {}", path.display(), e);
            e
        })
    }

    /// Writes the configuration, creating parent directories, and refreshes the cache.
    pub fn save(&self, config: &ChatDeckConfig) -> Result<()> {
        config.validate()?;
        let path = self.config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&path, content)?;

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(config.clone());
        Ok(())
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_config_is_default() {
        assert_eq!(ChatDeckConfig::from_toml_str("  \n").unwrap(), ChatDeckConfig::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = ChatDeckConfig::from_toml_str(
            r#"
            [paste]
            char_threshold = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.paste.char_threshold, 500);
        assert_eq!(config.paste.line_threshold, 40);
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn test_prompts_parse_into_groups() {
        let config = ChatDeckConfig::from_toml_str(
            r#"
            [[prompt]]
            id = "tr"
            name = "translate"
            text = "Translate {{text}}"
            "#,
        )
        .unwrap();
        let groups = config.prompt_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].variables(), vec!["text".to_string()]);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = ChatDeckConfig::from_toml_str(
            r#"
            [api]
            base_url = "localhost"
            "#,
        )
        .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_malformed_toml_is_serialization_error() {
        let err = ChatDeckConfig::from_toml_str("[api\nbase_url =").unwrap_err();
        assert!(matches!(err, ChatDeckError::Serialization { ref format, .. } if format == "TOML"));
    }

    #[test]
    fn test_env_override() {
        let mut config = ChatDeckConfig::default();
        config.apply_env_overrides(Some("https://chat.example.com/api".to_string()));
        assert_eq!(config.api.base_url, "https://chat.example.com/api");
        config.apply_env_overrides(Some(" ".to_string()));
        assert_eq!(config.api.base_url, "https://chat.example.com/api");
    }
}
