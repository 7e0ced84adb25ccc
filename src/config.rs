//! Configuration
//!
//! TOML configuration file. Every key is optional.
//!
//! Path resolution priority:
//! 1. `--config <path>` flag (must exist)
//! 2. `$LOGSTREAM_CONFIG` environment variable
//! 3. `./logstream.toml` if present
//! 4. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::stream::transport_http::{
    HttpTimeouts, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_POLL_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "LOGSTREAM_CONFIG";
/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "logstream.toml";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stream: StreamConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// `[stream]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Push endpoint URL
    pub endpoint: String,
    /// Maximum buffered lines (`None` = unbounded)
    pub capacity: Option<usize>,
    pub connect_timeout_secs: u64,
    /// Header wait limit and shutdown check interval of the body reader
    pub read_poll_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/api/logs/stream".to_string(),
            capacity: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_poll_ms: DEFAULT_READ_POLL_MS,
        }
    }
}

impl StreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// `[catalog]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Deadline for one catalog request
    pub request_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (`RUST_LOG` takes precedence)
    pub level: String,
    /// Emit JSON records instead of text
    pub json: bool,
    /// Log file; stderr when unset
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl Config {
    /// Parse and validate a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load config following the resolution priority
    ///
    /// Falls back to defaults when no file is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match resolve_config_path(explicit, std::env::var_os(CONFIG_ENV).map(PathBuf::from))? {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Transport timeouts derived from the `[stream]` and `[catalog]` sections
    pub fn http_timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect: self.stream.connect_timeout(),
            read_poll: Duration::from_millis(self.stream.read_poll_ms),
            request: Duration::from_secs(self.catalog.request_timeout_secs),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("stream.endpoint is empty".to_string()));
        }
        if self.stream.capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "stream.capacity must be greater than 0".to_string(),
            ));
        }
        if self.stream.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "stream.connect_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.stream.read_poll_ms == 0 {
            return Err(ConfigError::Invalid(
                "stream.read_poll_ms must be greater than 0".to_string(),
            ));
        }
        if self.catalog.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "catalog.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve which config file to read
///
/// # Arguments
/// * `explicit` - Path from the `--config` flag
/// * `from_env` - Value of `$LOGSTREAM_CONFIG`
///
/// # Returns
/// * `Ok(Some(path))` - File to read
/// * `Ok(None)` - No file; use defaults
pub fn resolve_config_path(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        // Explicit flag takes precedence and must exist
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Some(path) = from_env {
        return Ok(Some(path));
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }

    Ok(None)
}
