//! Configuration management for the cass MCP server.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{CassError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "CASS_MCP_CONFIG";

/// Environment variable injected into every cass invocation
pub const DATA_DIR_ENV: &str = "CASS_DATA_DIR";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub cass: CassConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// External binary configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CassConfig {
    /// Explicit path to the cass binary (auto-discovered when unset)
    #[serde(default)]
    pub binary: Option<PathBuf>,

    /// Data directory passed to cass via CASS_DATA_DIR
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Timeout for query-style tool calls
    #[serde(default = "default_timeout")]
    pub default_timeout_secs: u64,

    /// Timeout for cass_export
    #[serde(default = "default_export_timeout")]
    pub export_timeout_secs: u64,

    /// Timeout for a single index pass
    #[serde(default = "default_index_timeout")]
    pub index_timeout_secs: u64,
}

/// Background indexer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerConfig {
    /// Run `cass index --watch` instead of the periodic timer
    #[serde(default = "default_true")]
    pub enable_watch: bool,

    /// Run one incremental pass before entering steady state
    #[serde(default = "default_true")]
    pub index_on_start: bool,

    /// Periodic mode interval
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Delay before relaunching a crashed watch process
    #[serde(default = "default_restart_backoff")]
    pub restart_backoff_secs: u64,

    /// Time a watch process gets to exit after SIGTERM
    #[serde(default = "default_stop_grace")]
    pub stop_grace_secs: u64,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".cass"))
        .unwrap_or_else(|| PathBuf::from(".cass"))
}

fn default_timeout() -> u64 {
    30
}

fn default_export_timeout() -> u64 {
    60
}

fn default_index_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    300
}

fn default_restart_backoff() -> u64 {
    5
}

fn default_stop_grace() -> u64 {
    5
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for CassConfig {
    fn default() -> Self {
        Self {
            binary: None,
            data_dir: default_data_dir(),
            default_timeout_secs: default_timeout(),
            export_timeout_secs: default_export_timeout(),
            index_timeout_secs: default_index_timeout(),
        }
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            enable_watch: default_true(),
            index_on_start: default_true(),
            interval_secs: default_interval(),
            restart_backoff_secs: default_restart_backoff(),
            stop_grace_secs: default_stop_grace(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl CassConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    pub fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.export_timeout_secs)
    }

    pub fn index_timeout(&self) -> Duration {
        Duration::from_secs(self.index_timeout_secs)
    }
}

/// Parse a boolean flag the way the deployment scripts set them
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CassError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// The TOML file is `$CASS_MCP_CONFIG` when set, otherwise
    /// `~/.config/cass-mcp/config.toml` if it exists.
    pub fn load() -> Result<Self> {
        let file = match env::var(CONFIG_FILE_ENV) {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => Self::xdg_config_file().filter(|p| p.exists()),
        };
        Self::load_from(file.as_deref())
    }

    /// Load config from an explicit file (or defaults), then apply env
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Defaults with environment overrides, used when loading fails
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.merge_env();
        config
    }

    fn xdg_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cass-mcp").join("config.toml"))
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // External binary
        if let Ok(binary) = env::var("CASS_BINARY") {
            if !binary.trim().is_empty() {
                self.cass.binary = Some(PathBuf::from(binary));
            }
        }
        if let Ok(data_dir) = env::var(DATA_DIR_ENV) {
            self.cass.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(timeout) = env::var("CASS_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.cass.default_timeout_secs = t;
            }
        }

        // Background indexer
        if let Ok(watch) = env::var("CASS_ENABLE_WATCH") {
            self.indexer.enable_watch = parse_flag(&watch);
        }
        if let Ok(on_start) = env::var("CASS_INDEX_ON_START") {
            self.indexer.index_on_start = parse_flag(&on_start);
        }
        if let Ok(interval) = env::var("CASS_INDEX_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                self.indexer.interval_secs = secs;
            }
        }

        // Listener
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.cass.default_timeout_secs == 0
            || self.cass.export_timeout_secs == 0
            || self.cass.index_timeout_secs == 0
        {
            return Err(CassError::ConfigError(
                "Timeouts must be non-zero".to_string(),
            ));
        }

        if self.indexer.interval_secs == 0 {
            return Err(CassError::ConfigError(
                "Index interval must be non-zero".to_string(),
            ));
        }

        if self.server.host.trim().is_empty() {
            return Err(CassError::ConfigError("Host cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        match &self.cass.binary {
            Some(binary) => tracing::info!("  CASS binary: {:?}", binary),
            None => tracing::info!("  CASS binary: auto-discover"),
        }
        tracing::info!("  Data directory: {:?}", self.cass.data_dir);
        tracing::info!("  Tool timeout: {}s", self.cass.default_timeout_secs);
        tracing::info!("  Watch mode enabled: {}", self.indexer.enable_watch);
        tracing::info!("  Index on start: {}", self.indexer.index_on_start);
        tracing::info!("  Index interval: {}s", self.indexer.interval_secs);
        tracing::info!("  Listen: {}:{}", self.server.host, self.server.port);
    }
}
