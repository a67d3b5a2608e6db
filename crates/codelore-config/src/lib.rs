#![deny(unsafe_code)]

//! Configuration loading and validation for Codelore.
//!
//! Loads TOML configuration files and validates them against expected schemas.
//! Provides the [`AppConfig`] type as the central configuration structure.
//! Providers never read the process environment themselves — everything they
//! need arrives through [`LlmConfig`].

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM backend configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Git history collection configuration.
    #[serde(default)]
    pub git: GitConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Port the server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_listen_port() -> u16 {
    8000
}

/// Which LLM backend handles analysis requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// Cloud backend behind an OpenAI-compatible API, requires an API key.
    #[default]
    Hosted,
    /// Self-hosted Ollama server (`/api/generate`).
    Ollama,
    /// Self-hosted OpenAI-compatible server (`/v1/chat/completions`).
    #[serde(rename = "localai")]
    LocalAi,
}

impl LlmProviderKind {
    /// Stable identifier used in selection, metadata, and the HTTP API.
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProviderKind::Hosted => "hosted",
            LlmProviderKind::Ollama => "ollama",
            LlmProviderKind::LocalAi => "localai",
        }
    }

    /// Parse a provider name as it appears in requests and config.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hosted" => Some(LlmProviderKind::Hosted),
            "ollama" => Some(LlmProviderKind::Ollama),
            "localai" => Some(LlmProviderKind::LocalAi),
            _ => None,
        }
    }
}

/// LLM backend configuration.
///
/// ## TOML Example
///
/// ```toml
/// [llm]
/// provider = "ollama"
/// api_base = "http://localhost:11434"
/// model = "llama3"
/// timeout_secs = 120
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Default provider when a request does not name one.
    #[serde(default)]
    pub provider: LlmProviderKind,

    /// API key for the hosted provider. Empty means not configured.
    #[serde(default)]
    pub api_key: String,

    /// Base URL override. Each provider has its own default.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Model override. Empty means the provider's default model.
    #[serde(default)]
    pub model: String,

    /// Request timeout for local backends, in seconds.
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature.
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    /// Completion token cap for local chat backends.
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            api_key: String::new(),
            api_base: None,
            model: String::new(),
            timeout_secs: default_llm_timeout_secs(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
        }
    }
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_llm_temperature() -> f32 {
    0.3
}

fn default_llm_max_tokens() -> u32 {
    1000
}

/// Git history collection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Default number of commits to analyze per request.
    #[serde(default = "default_commit_limit")]
    pub commit_limit: usize,

    /// How many commits back to scan for co-changed files.
    #[serde(default = "default_co_change_window")]
    pub co_change_window: usize,

    /// Line cap when reading the target file from disk.
    #[serde(default = "default_max_file_lines")]
    pub max_file_lines: usize,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            commit_limit: default_commit_limit(),
            co_change_window: default_co_change_window(),
            max_file_lines: default_max_file_lines(),
        }
    }
}

fn default_commit_limit() -> usize {
    50
}

fn default_co_change_window() -> usize {
    100
}

fn default_max_file_lines() -> usize {
    10_000
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen_port == 0 {
            return Err(ConfigError::Validation(
                "server.listen_port must be non-zero".to_string(),
            ));
        }
        if self.server.listen_addr.is_empty() {
            return Err(ConfigError::Validation(
                "server.listen_addr must not be empty".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "llm.timeout_secs must be non-zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be in [0.0, 2.0], got {}",
                self.llm.temperature
            )));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "llm.max_tokens must be non-zero".to_string(),
            ));
        }
        if let Some(ref base) = self.llm.api_base {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "llm.api_base must be an http(s) URL, got {base:?}"
                )));
            }
        }

        if self.git.commit_limit == 0 || self.git.commit_limit > 100 {
            return Err(ConfigError::Validation(format!(
                "git.commit_limit must be in 1..=100, got {}",
                self.git.commit_limit
            )));
        }
        if self.git.co_change_window == 0 {
            return Err(ConfigError::Validation(
                "git.co_change_window must be non-zero".to_string(),
            ));
        }
        if self.git.max_file_lines == 0 {
            return Err(ConfigError::Validation(
                "git.max_file_lines must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}
