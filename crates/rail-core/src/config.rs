//! Service configuration for the railbank server
//!
//! Settings are loaded from a file (TOML, JSON, or YAML) and can be
//! overridden with `RAIL__`-prefixed environment variables, e.g.
//! `RAIL__SERVER__PORT=8006`. The guardrail pipeline document itself is
//! separate data (see `rail-pipeline`); this module only knows its path.

use crate::error::{RailError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for the railbank service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Model completion settings
    #[serde(default)]
    pub model: ModelSettings,

    /// External validation engine settings
    #[serde(default)]
    pub engine: EngineSettings,

    /// Guardrail pipeline settings
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format
    #[serde(default)]
    pub json: bool,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Model completion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model identifier, e.g. "gpt-4o"
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// External validation engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Base URL of the validation engine
    #[serde(default = "default_engine_url")]
    pub base_url: String,
}

/// Guardrail pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Path to the pipeline JSON document
    #[serde(default = "default_pipeline_path")]
    pub config_path: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8006
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_engine_url() -> String {
    "http://localhost:9100".to_string()
}

fn default_pipeline_path() -> String {
    "config/combined_config.json".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: default_engine_url(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            config_path: default_pipeline_path(),
        }
    }
}

/// Load service configuration from a file
///
/// Supports TOML, JSON, and YAML formats based on file extension.
/// Environment variables with the `RAIL__` prefix override file values.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RailError::config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("RAIL").separator("__"))
        .build()?;

    let config: ServiceConfig = settings.try_deserialize()?;

    tracing::info!("Configuration loaded from {}", path.display());

    Ok(config)
}

/// Load service configuration with defaults if the file doesn't exist
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> ServiceConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            ServiceConfig::default()
        }
    }
}
