use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "MINIHTTPD_CONFIG";

const DEFAULT_PORT: u16 = 12345;
const DEFAULT_WORKERS: usize = 4;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;
const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Top-level configuration.
///
/// ```yaml
/// server:
///   port: 8080
///   workers: 8
///   read_timeout_secs: 10
/// static_files:
///   root: ./web
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: Option<StaticFilesConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listening port
    pub port: u16,
    /// Size of the worker pool
    pub workers: usize,
    /// Idle-read timeout per connection, `0` disables it
    pub read_timeout_secs: u64,
    /// Largest request head buffered before the connection is dropped
    pub max_header_bytes: usize,
    /// Largest `Content-Length` accepted
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(0));
        }
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if self.max_header_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_header_bytes".to_string(),
                value: "0".to_string(),
            });
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_body_bytes".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

impl Config {
    /// Loads the file named by `MINIHTTPD_CONFIG`, or falls back to
    /// `PORT`, `WORKERS`, `READ_TIMEOUT_SECS`, `MAX_BODY_BYTES` and
    /// `STATIC_ROOT`.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => Self::from_lookup(|key| std::env::var(key).ok()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_yaml::from_str(text)?;
        cfg.server.validate()?;
        Ok(cfg)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        if let Some(port) = lookup("PORT") {
            let port: u32 = parse_value("PORT", &port)?;
            cfg.server.port = u16::try_from(port).map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(workers) = lookup("WORKERS") {
            cfg.server.workers = parse_value("WORKERS", &workers)?;
        }
        if let Some(secs) = lookup("READ_TIMEOUT_SECS") {
            cfg.server.read_timeout_secs = parse_value("READ_TIMEOUT_SECS", &secs)?;
        }
        if let Some(bytes) = lookup("MAX_BODY_BYTES") {
            cfg.server.max_body_bytes = parse_value("MAX_BODY_BYTES", &bytes)?;
        }
        if let Some(root) = lookup("STATIC_ROOT") {
            cfg.static_files = Some(StaticFilesConfig { root: root.into() });
        }

        cfg.server.validate()?;
        Ok(cfg)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
