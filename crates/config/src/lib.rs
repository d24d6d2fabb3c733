//! Configuration loading, validation, and management for readchat.
//!
//! Loads configuration from `~/.readchat/config.toml`, then applies
//! environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder for the user's question inside the book-history template.
pub const QUESTION_PLACEHOLDER: &str = "{user_question}";
/// Placeholder for the rendered book records inside the template.
pub const DATA_PLACEHOLDER: &str = "{data}";

/// The root configuration structure.
///
/// Maps directly to `~/.readchat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model API credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("agent", &self.agent)
            .field("prompt", &self.prompt)
            .field("search", &self.search)
            .field("memory", &self.memory)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Upper bound on model round-trips per question
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Cap on tokens per model reply; unset leaves it to the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_system_prompt() -> String {
    "You are an assistant that answers questions about the user's reading history. \
     To answer, invoke book_history or bing_search only."
        .into()
}
fn default_max_iterations() -> u32 {
    15
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            max_iterations: default_max_iterations(),
            max_tokens: None,
        }
    }
}

/// Wording of the `book_history` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Must contain `{user_question}` and `{data}`
    #[serde(default = "default_template")]
    pub template: String,

    #[serde(default = "default_tool_description")]
    pub tool_description: String,
}

fn default_template() -> String {
    "\n{user_question}\n以下は質問者の読書履歴データです。データに基づいて上記の質問に答えてください。\n\n\n{data}\n\n"
        .into()
}
fn default_tool_description() -> String {
    "読書履歴データを元に、本に関するユーザーの質問に答える".into()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            tool_description: default_tool_description(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Bing Web Search subscription key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Results requested per search
    #[serde(default = "default_search_count")]
    pub count: u32,
}

fn default_search_endpoint() -> String {
    "https://api.bing.microsoft.com/v7.0/search".into()
}
fn default_search_count() -> u32 {
    3
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &redact(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("count", &self.count)
            .finish()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_search_endpoint(),
            count: default_search_count(),
        }
    }
}

/// Where conversation history lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryBackendKind {
    /// Process memory, gone on restart
    #[default]
    InMemory,
    /// TTL-keyed cache persisted under `cache_dir/cache_name`
    Cache,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub backend: MemoryBackendKind,

    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Lifetime of a session's history after its last write
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

fn default_cache_name() -> String {
    "readchat".into()
}
fn default_ttl_hours() -> u64 {
    24
}

impl MemoryConfig {
    /// The configured cache directory, or `~/.readchat/cache`.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("cache"))
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: MemoryBackendKind::default(),
            cache_name: default_cache_name(),
            ttl_hours: default_ttl_hours(),
            cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8501
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.readchat/config.toml` plus the process
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// - `READCHAT_API_KEY`, then `OPENAI_API_KEY` (only if no key is configured)
    /// - `READCHAT_MODEL`
    /// - `BING_SUBSCRIPTION_KEY`, `BING_SEARCH_URL`
    /// - `READCHAT_CACHE_NAME` (also switches memory to the cache backend)
    /// - `READCHAT_CACHE_TTL_HOURS`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("READCHAT_API_KEY").or_else(|| non_empty("OPENAI_API_KEY"));
        }
        if let Some(model) = non_empty("READCHAT_MODEL") {
            self.model = model;
        }
        if let Some(key) = non_empty("BING_SUBSCRIPTION_KEY") {
            self.search.api_key = Some(key);
        }
        if let Some(url) = non_empty("BING_SEARCH_URL") {
            self.search.endpoint = url;
        }
        if let Some(name) = non_empty("READCHAT_CACHE_NAME") {
            self.memory.cache_name = name;
            self.memory.backend = MemoryBackendKind::Cache;
        }
        if let Some(ttl) = non_empty("READCHAT_CACHE_TTL_HOURS") {
            match ttl.trim().parse() {
                Ok(hours) => self.memory.ttl_hours = hours,
                Err(_) => tracing::warn!(value = %ttl, "Ignoring unparseable READCHAT_CACHE_TTL_HOURS"),
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".readchat")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.memory.ttl_hours == 0 {
            return Err(ConfigError::ValidationError(
                "memory.ttl_hours must be > 0".into(),
            ));
        }

        for placeholder in [QUESTION_PLACEHOLDER, DATA_PLACEHOLDER] {
            if !self.prompt.template.contains(placeholder) {
                return Err(ConfigError::ValidationError(format!(
                    "prompt.template must contain {placeholder}"
                )));
            }
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be > 0".into(),
            ));
        }

        if self.agent.max_tokens == Some(0) {
            return Err(ConfigError::ValidationError(
                "agent.max_tokens must be > 0 when set".into(),
            ));
        }

        Ok(())
    }

    /// Check if a model credential is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `readchat config`).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: 0.0,
            agent: AgentConfig::default(),
            prompt: PromptConfig::default(),
            search: SearchConfig::default(),
            memory: MemoryConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.memory.backend, MemoryBackendKind::InMemory);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.prompt.template, config.prompt.template);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn template_without_data_placeholder_rejected() {
        let mut config = AppConfig::default();
        config.prompt.template = "{user_question} only".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("{data}"));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.api_url, "https://api.openai.com/v1");
    }

    #[test]
    fn load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
model = "gpt-4o-mini"

[memory]
backend = "cache"
cache_name = "books"
ttl_hours = 2
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.memory.backend, MemoryBackendKind::Cache);
        assert_eq!(config.memory.cache_name, "books");
        assert_eq!(config.memory.ttl_hours, 2);
        assert_eq!(config.agent.max_iterations, 15);
        assert_eq!(config.agent.max_tokens, None);
    }

    #[test]
    fn agent_limits_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[agent]
max_iterations = 4
max_tokens = 512
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.agent.max_iterations, 4);
        assert_eq!(config.agent.max_tokens, Some(512));
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_tokens = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_supplies_openai_key() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("OPENAI_API_KEY", "sk-test")]));
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert!(config.has_api_key());
    }

    #[test]
    fn empty_env_key_counts_as_missing() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("OPENAI_API_KEY", "")]));
        assert!(!config.has_api_key());
    }

    #[test]
    fn cache_env_switches_backend() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("READCHAT_CACHE_NAME", "reading"),
            ("READCHAT_CACHE_TTL_HOURS", "6"),
        ]));
        assert_eq!(config.memory.backend, MemoryBackendKind::Cache);
        assert_eq!(config.memory.cache_name, "reading");
        assert_eq!(config.memory.ttl_hours, 6);
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-secret".into());
        config.search.api_key = Some("bing-secret".into());
        let text = format!("{config:?}");
        assert!(!text.contains("sk-secret"));
        assert!(!text.contains("bing-secret"));
        assert!(text.contains("[REDACTED]"));
    }
}
