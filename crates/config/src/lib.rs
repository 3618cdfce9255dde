//! Configuration loading, validation, and management for Strata.
//!
//! Loads configuration from `~/.strata/strata.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure.
///
/// Maps directly to `~/.strata/strata.toml`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Summarization service configuration
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Persistence configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Engine (merge/promotion) configuration
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("summarizer", &self.summarizer)
            .field("store", &self.store)
            .field("gateway", &self.gateway)
            .field("engine", &self.engine)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Which backend to use: "anthropic", "openai-compatible", or "scripted"
    /// (test stub).
    #[serde(default = "default_summarizer_provider")]
    pub provider: String,

    /// API key for the selected backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override (proxies, self-hosted endpoints).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model identifier passed to the backend.
    #[serde(default = "default_summarizer_model")]
    pub model: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient failure (0 disables the retry).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_summarizer_provider() -> String {
    "anthropic".into()
}
fn default_summarizer_model() -> String {
    "claude-haiku-35-20241022".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    1
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: default_summarizer_provider(),
            api_key: None,
            api_url: None,
            model: default_summarizer_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl std::fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("provider", &self.provider)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend to use: "sqlite" or "memory".
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// SQLite database path. Defaults to `<workspace>/memory.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqlite_path: Option<String>,
}

fn default_store_backend() -> String {
    "sqlite".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            sqlite_path: None,
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
    42910
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Mention count at which a fact is promoted into the personal profile.
    #[serde(default = "default_promotion_threshold")]
    pub promotion_threshold: u32,

    /// Hard post-merge clip, as a multiple of the layer's word budget.
    #[serde(default = "default_hard_clip_factor")]
    pub hard_clip_factor: f32,

    /// Most recent transcripts considered by the style analyzer.
    #[serde(default = "default_style_transcript_cap")]
    pub style_transcript_cap: usize,
}

fn default_promotion_threshold() -> u32 {
    3
}
fn default_hard_clip_factor() -> f32 {
    1.5
}
fn default_style_transcript_cap() -> usize {
    20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            promotion_threshold: default_promotion_threshold(),
            hard_clip_factor: default_hard_clip_factor(),
            style_transcript_cap: default_style_transcript_cap(),
        }
    }
}

impl AppConfig {
    /// The workspace directory, `~/.strata`.
    pub fn workspace_dir() -> PathBuf {
        std::env::var_os("STRATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".strata")
            })
    }

    /// The default config file path, `~/.strata/strata.toml`.
    pub fn default_path() -> PathBuf {
        Self::workspace_dir().join("strata.toml")
    }

    /// Load configuration from the default path, falling back to defaults
    /// when the file doesn't exist, then apply env overrides and validate.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&raw)?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over file values.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("STRATA_API_KEY") {
            if !key.is_empty() {
                self.summarizer.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("STRATA_API_URL") {
            if !url.is_empty() {
                self.summarizer.api_url = Some(url);
            }
        }
        if let Ok(model) = std::env::var("STRATA_MODEL") {
            if !model.is_empty() {
                self.summarizer.model = model;
            }
        }
        if let Ok(port) = std::env::var("STRATA_PORT") {
            if let Ok(port) = port.parse() {
                self.gateway.port = port;
            }
        }
        if let Ok(path) = std::env::var("STRATA_SQLITE_PATH") {
            if !path.is_empty() {
                self.store.sqlite_path = Some(path);
            }
        }
    }

    /// Validate settings. Called after every load.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.summarizer.provider.as_str() {
            "anthropic" | "openai-compatible" | "scripted" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown summarizer provider '{other}' (expected anthropic, openai-compatible, or scripted)"
                )));
            }
        }
        match self.store.backend.as_str() {
            "sqlite" | "memory" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown store backend '{other}' (expected sqlite or memory)"
                )));
            }
        }
        if self.summarizer.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "summarizer.timeout_secs must be positive".into(),
            ));
        }
        if self.engine.promotion_threshold == 0 {
            return Err(ConfigError::Invalid(
                "engine.promotion_threshold must be positive".into(),
            ));
        }
        if self.engine.hard_clip_factor < 1.0 {
            return Err(ConfigError::Invalid(
                "engine.hard_clip_factor must be at least 1.0".into(),
            ));
        }
        Ok(())
    }

    /// The resolved SQLite path.
    pub fn sqlite_path(&self) -> PathBuf {
        self.store
            .sqlite_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::workspace_dir().join("memory.db"))
    }
}
