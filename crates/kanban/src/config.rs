//! Configuration management for kanban.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "kanban";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "KANBAN_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `KANBAN_`, sections separated by `__`,
///    e.g. `KANBAN_SERVER__PORT=8080`)
/// 2. TOML config file at `~/.config/kanban/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Number of runtime worker threads.
    pub workers: usize,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

/// Which store holds the board document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// A single pretty-printed JSON file.
    #[default]
    Json,
    /// An embedded `SQLite` database with transactional writes.
    Sqlite,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend holding the board.
    pub backend: StorageBackend,
    /// Directory holding the data file.
    /// Defaults to `~/.local/share/kanban`
    pub data_dir: Option<PathBuf>,
    /// Name of the JSON board file inside `data_dir`.
    pub file_name: String,
    /// Name of the `SQLite` database inside `data_dir`.
    pub database_file_name: String,
    /// Loads and saves slower than this are logged as warnings.
    pub slow_io_warn_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            workers: 4,
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            data_dir: None, // Resolved at runtime
            file_name: "kanban.json".to_string(),
            database_file_name: "kanban.db".to_string(),
            slow_io_warn_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.workers == 0 {
            return Err(Error::ConfigValidation {
                message: "server.workers must be greater than 0".to_string(),
            });
        }

        if self.server.request_timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "server.request_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.server.max_body_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "server.max_body_bytes must be greater than 0".to_string(),
            });
        }

        if self.server.host.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "server.host cannot be empty".to_string(),
            });
        }

        for (key, name) in [
            ("storage.file_name", &self.storage.file_name),
            ("storage.database_file_name", &self.storage.database_file_name),
        ] {
            if name.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("{key} cannot be empty"),
                });
            }
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Path to the JSON board file.
    #[must_use]
    pub fn board_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.file_name)
    }

    /// Path to the `SQLite` database.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.database_file_name)
    }

    /// The address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.host` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| Error::ConfigValidation {
            message: format!("invalid bind address: {addr}"),
        })
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get the slow I/O warning threshold as a Duration.
    #[must_use]
    pub fn slow_io_threshold(&self) -> Duration {
        Duration::from_millis(self.storage.slow_io_warn_ms)
    }
}
