//! Server configuration.
//!
//! Resolved once at start-up. Precedence, highest first: command-line flags,
//! environment variables (clap binds each flag to one), the TOML config file,
//! built-in defaults.

pub mod loader;

pub use loader::{find_config_file, load_file_config, read_config_file};

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use serde::Deserialize;
use thiserror::Error;

use things3_sdk::bridge::applescript::DEFAULT_SCRIPT_TIMEOUT;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8765;

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// MCP transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Settings as read from `.things3-mcp.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub transport: Option<Transport>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    pub api_token: Option<String>,
    /// Path to the Things `main.sqlite`.
    pub database: Option<PathBuf>,
    /// URL-scheme token; read from the database when unset.
    pub things_auth_token: Option<String>,
    pub script_timeout_secs: Option<u64>,
    pub log_format: Option<LogFormat>,
}

/// Command-line flags, each also bound to an environment variable.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Config file (default: ./.things3-mcp.toml, then ~/.config/things3-mcp.toml)
    #[arg(long, env = "THINGS_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// MCP transport
    #[arg(long, value_enum, env = "THINGS_MCP_TRANSPORT")]
    pub transport: Option<Transport>,

    /// HTTP bind address
    #[arg(long, env = "THINGS_MCP_HOST")]
    pub host: Option<String>,

    /// HTTP port
    #[arg(long, env = "THINGS_MCP_PORT")]
    pub port: Option<u16>,

    /// API key for the HTTP transport (generated when unset)
    #[arg(long, env = "THINGS_MCP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Bearer token accepted by the HTTP transport
    #[arg(long, env = "THINGS_MCP_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Path to the Things database
    #[arg(long, env = "THINGSDB")]
    pub database: Option<PathBuf>,

    /// Things URL-scheme auth token (default: read from the database)
    #[arg(long, env = "THINGS_AUTH_TOKEN", hide_env_values = true)]
    pub things_auth_token: Option<String>,

    /// AppleScript timeout in seconds
    #[arg(long, env = "THINGS_MCP_SCRIPT_TIMEOUT")]
    pub script_timeout: Option<u64>,

    /// Log output format
    #[arg(long, value_enum, env = "THINGS_MCP_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub api_key: Option<String>,
    pub api_token: Option<String>,
    pub database: Option<PathBuf>,
    pub things_auth_token: Option<String>,
    pub script_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            api_token: None,
            database: None,
            things_auth_token: None,
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
            log_format: LogFormat::Text,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    /// Merge flags over the file over defaults, then validate.
    pub fn resolve(args: ConfigArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let script_timeout = args
            .script_timeout
            .or(file.script_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.script_timeout);

        let config = Self {
            transport: args.transport.or(file.transport).unwrap_or(defaults.transport),
            host: non_empty(args.host)
                .or(non_empty(file.host))
                .unwrap_or(defaults.host),
            port: args.port.or(file.port).unwrap_or(defaults.port),
            api_key: non_empty(args.api_key).or(non_empty(file.api_key)),
            api_token: non_empty(args.api_token).or(non_empty(file.api_token)),
            database: args.database.or(file.database),
            things_auth_token: non_empty(args.things_auth_token)
                .or(non_empty(file.things_auth_token)),
            script_timeout,
            log_format: args.log_format.or(file.log_format).unwrap_or(defaults.log_format),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.script_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "script timeout must be at least one second".to_string(),
            ));
        }
        if self.transport == Transport::Http && self.port == 0 {
            return Err(ConfigError::Invalid("HTTP port must be non-zero".to_string()));
        }
        Ok(())
    }

    /// `host:port` for the HTTP listener; IPv6 literals are bracketed.
    pub fn bind_address(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}
