//! Service configuration.
//!
//! Configuration is layered: built-in defaults, an optional config file,
//! `ECOSYNC_<SECTION>__<KEY>` environment variables, and finally
//! `GEMINI_API_KEY` for the model credentials.

use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "ECOSYNC";

/// Environment variable holding the model provider API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// External model settings
    pub model: ModelConfig,
    /// Upload handling settings
    pub uploads: UploadConfig,
    /// Budget computation settings
    pub budget: BudgetConfig,
    /// Telemetry settings
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Load configuration from the environment only.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load configuration, optionally reading a config file first.
    ///
    /// The file format is picked from the extension (toml, yaml, json).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("model.api_key", std::env::var(API_KEY_ENV).ok())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config_key("port must be non-zero", "server.port"));
        }
        if self.model.api_key.trim().is_empty() {
            return Err(Error::config_key(
                format!("model API key is empty (set {})", API_KEY_ENV),
                "model.api_key",
            ));
        }
        if self.model.model.trim().is_empty() {
            return Err(Error::config_key("model name is empty", "model.model"));
        }
        if self.model.timeout_secs == 0 {
            return Err(Error::config_key(
                "timeout must be non-zero",
                "model.timeout_secs",
            ));
        }
        if self.uploads.max_bytes == 0 {
            return Err(Error::config_key(
                "upload limit must be non-zero",
                "uploads.max_bytes",
            ));
        }
        if self.uploads.allowed_mime_types.is_empty() {
            return Err(Error::config_key(
                "at least one MIME type must be allowed",
                "uploads.allowed_mime_types",
            ));
        }
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8011,
        }
    }
}

impl ServerConfig {
    /// The `host:port` string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// External model configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Provider API key
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Provider base URL
    pub base_url: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    /// Retries for unavailable / rate-limited responses
    pub max_retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

impl ModelConfig {
    /// Get the per-call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Upload handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory for per-request scratch files
    pub temp_dir: PathBuf,
    /// Maximum accepted file size in bytes
    pub max_bytes: usize,
    /// Accepted MIME types for bill files
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            max_bytes: 10 * 1024 * 1024,
            allowed_mime_types: vec![
                "image/jpeg".to_string(),
                "image/jpg".to_string(),
                "image/png".to_string(),
                "application/pdf".to_string(),
            ],
        }
    }
}

impl UploadConfig {
    /// Check whether a MIME type is accepted.
    pub fn is_allowed(&self, mime_type: &str) -> bool {
        let mime_type = mime_type.trim();
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }
}

/// Budget computation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Clamp the requested reduction percent into [0, 100]
    pub clamp_reduction_percent: bool,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            clamp_reduction_percent: true,
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Whether counters are collected
    pub enabled: bool,
    /// Service name reported by health and metrics endpoints
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "ecosync".to_string(),
        }
    }
}
