//! YAML configuration for qmonitor.
//!
//! One file configures the matcher and the log output of a process.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "alerts"
//!
//! matcher:
//!   version: "v1"
//!   strategy: "highlighting"
//!   slow_log_limit_ns: 5000000
//!   decompose: true
//!   parallel: true
//!   worker_threads: 4
//!
//! logging:
//!   level: "info"
//!   json: false
//! ```

use std::error::Error;
use std::fs;
use std::path::Path;

use matcher::{MatcherConfig, MatcherError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

impl From<MatcherError> for ConfigLoadError {
    fn from(err: MatcherError) -> Self {
        ConfigLoadError::Validation(err.to_string())
    }
}

/// Top-level YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub matcher: MatcherConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: MonitorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;
        self.matcher.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    pub fn matcher_config(&self) -> &MatcherConfig {
        &self.matcher
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            matcher: MatcherConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset. Accepts `EnvFilter`
    /// directives, e.g. `info` or `warn,matcher=debug`.
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        EnvFilter::try_new(&self.level).map(|_| ()).map_err(|e| {
            ConfigLoadError::Validation(format!(
                "logging.level is not a valid filter ({}): {e}",
                self.level
            ))
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Install a global `tracing` subscriber for `cfg`.
///
/// `RUST_LOG` takes precedence over `cfg.level`. Fails if a global
/// subscriber is already set.
pub fn init_tracing(cfg: &LoggingConfig) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cfg.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}
